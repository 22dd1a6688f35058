// Shared names and limits used across the analyzer, optimizer and lowering

// Type names understood by the type model
pub const INT_TYPE: &str = "int";
pub const BOOLEAN_TYPE: &str = "boolean";
pub const VOID_TYPE: &str = "void";
pub const STRING_TYPE: &str = "String";
// Sentinel for expressions whose type comes from code we cannot see (imports, superclass)
pub const UNKNOWN_TYPE: &str = "unknown";

// The designated entry method; always treated as static
pub const ENTRY_METHOD: &str = "main";

// Optimizer: default cap on folding/propagation rounds
pub const DEFAULT_OPTIMIZATION_ROUNDS: usize = 5;

// Lowering: temporary prefix and constructor name
pub const TEMP_PREFIX: &str = "t";
pub const CONSTRUCTOR_NAME: &str = "<init>";

// Reports without a source position use this for line and column
pub const UNKNOWN_POSITION: i32 = -1;

// Receiver variable; register 0 of instance methods, never reallocated
pub const THIS_NAME: &str = "this";
