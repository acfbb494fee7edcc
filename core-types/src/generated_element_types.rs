/// Element precisions an IR file may declare
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ElementType {
    F32,
    F16,
    BF16,
    F64,
    I64,
    I32,
    I16,
    I8,
    U64,
    U32,
    U16,
    U8,
    Bool,
}

impl ElementType {
    /// Every supported element type, in declaration order
    pub const ALL: &'static [ElementType] = &[
        ElementType::F32,
        ElementType::F16,
        ElementType::BF16,
        ElementType::F64,
        ElementType::I64,
        ElementType::I32,
        ElementType::I16,
        ElementType::I8,
        ElementType::U64,
        ElementType::U32,
        ElementType::U16,
        ElementType::U8,
        ElementType::Bool,
    ];

    /// Size of one element, in bytes
    pub fn size_in_bytes(self) -> usize {
        match self {
            ElementType::F32 => 4,
            ElementType::F16 => 2,
            ElementType::BF16 => 2,
            ElementType::F64 => 8,
            ElementType::I64 => 8,
            ElementType::I32 => 4,
            ElementType::I16 => 2,
            ElementType::I8 => 1,
            ElementType::U64 => 8,
            ElementType::U32 => 4,
            ElementType::U16 => 2,
            ElementType::U8 => 1,
            ElementType::Bool => 1,
        }
    }

    /// Precision name as written in IR files
    pub fn ir_name(self) -> &'static str {
        match self {
            ElementType::F32 => "FP32",
            ElementType::F16 => "FP16",
            ElementType::BF16 => "BF16",
            ElementType::F64 => "FP64",
            ElementType::I64 => "I64",
            ElementType::I32 => "I32",
            ElementType::I16 => "I16",
            ElementType::I8 => "I8",
            ElementType::U64 => "U64",
            ElementType::U32 => "U32",
            ElementType::U16 => "U16",
            ElementType::U8 => "U8",
            ElementType::Bool => "BOOL",
        }
    }

    pub fn is_float(self) -> bool {
        match self {
            ElementType::F32 => true,
            ElementType::F16 => true,
            ElementType::BF16 => true,
            ElementType::F64 => true,
            ElementType::I64 => false,
            ElementType::I32 => false,
            ElementType::I16 => false,
            ElementType::I8 => false,
            ElementType::U64 => false,
            ElementType::U32 => false,
            ElementType::U16 => false,
            ElementType::U8 => false,
            ElementType::Bool => false,
        }
    }

    /// Parse an IR precision name, case-insensitive (`FP32`, `f32`, ...)
    pub fn from_ir_name(name: &str) -> Option<Self> {
        match name.to_ascii_uppercase().as_str() {
            "FP32" | "F32" => Some(ElementType::F32),
            "FP16" | "F16" => Some(ElementType::F16),
            "BF16" => Some(ElementType::BF16),
            "FP64" | "F64" => Some(ElementType::F64),
            "I64" => Some(ElementType::I64),
            "I32" => Some(ElementType::I32),
            "I16" => Some(ElementType::I16),
            "I8" => Some(ElementType::I8),
            "U64" => Some(ElementType::U64),
            "U32" => Some(ElementType::U32),
            "U16" => Some(ElementType::U16),
            "U8" => Some(ElementType::U8),
            "BOOL" => Some(ElementType::Bool),
            _ => None,
        }
    }
}