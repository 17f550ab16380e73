/// Defines which buffer axis of a rank-4 tensor carries the channels.
///
/// The axis order determines how the three spatial axes map onto buffer axes:
/// - `ChannelsLast`: buffers are `[spatial0, spatial1, spatial2, channels]`.
/// - `ChannelsFirst`: buffers are `[channels, spatial0, spatial1, spatial2]`.
///
/// The selector only affects how layers address the buffer at execution time; it never
/// changes how per-axis configuration (such as padding amounts) is specified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DataFormat {
    ChannelsFirst,
    #[default]
    ChannelsLast,
}

impl DataFormat {
    /// Describes the expected buffer axis order, for validation messages.
    pub fn axis_description(&self) -> &'static str {
        match self {
            DataFormat::ChannelsFirst => "[channels, spatial0, spatial1, spatial2]",
            DataFormat::ChannelsLast => "[spatial0, spatial1, spatial2, channels]",
        }
    }
}
