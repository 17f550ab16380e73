/// Error types that can occur while applying a layer
///
/// # Variants
///
/// - `InputValidationError` - indicates the input tensor does not meet the expected rank or format
/// - `ProcessingError` - indicates that something went wrong while processing
/// - `Engine` - wraps a failure reported by the texture engine backing the GPU path
#[derive(Debug, Clone, PartialEq)]
pub enum LayerError {
    InputValidationError(String),
    ProcessingError(String),
    Engine(EngineError),
}

impl std::fmt::Display for LayerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LayerError::InputValidationError(msg) => write!(f, "Input validation error: {}", msg),
            LayerError::ProcessingError(msg) => write!(f, "Processing error: {}", msg),
            LayerError::Engine(e) => write!(f, "Texture engine error: {}", e),
        }
    }
}

impl std::error::Error for LayerError {}

impl From<EngineError> for LayerError {
    fn from(e: EngineError) -> Self {
        LayerError::Engine(e)
    }
}

/// Error types reported by texture engines
///
/// Engine failures are collaborator failures (no GPU adapter, shader compile failure,
/// a resource id that was never created or was already released). The padding operator
/// never retries on these; they are surfaced to the caller as fatal errors.
///
/// # Variants
///
/// - `DeviceUnavailable` - no compatible GPU device could be acquired
/// - `CompileError` - a program source failed to compile
/// - `InvalidResource` - a texture or program id does not name a live resource, or a
///   resource was used with mismatched shape or format
/// - `Unsupported` - the engine cannot perform the requested operation
#[derive(Debug, Clone, PartialEq)]
pub enum EngineError {
    DeviceUnavailable(String),
    CompileError(String),
    InvalidResource(String),
    Unsupported(String),
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::DeviceUnavailable(msg) => write!(f, "Device unavailable: {}", msg),
            EngineError::CompileError(msg) => write!(f, "Program compile error: {}", msg),
            EngineError::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
            EngineError::Unsupported(msg) => write!(f, "Unsupported operation: {}", msg),
        }
    }
}

impl std::error::Error for EngineError {}
