use std::fmt;
use std::str::FromStr;

use thiserror::Error;

include!("generated_element_types.rs");

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.ir_name())
    }
}

/// One dimension of a tensor shape
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Dim {
    Static(u64),
    /// Unknown until runtime (`-1` or `?` in IR files)
    Dynamic,
}

impl Dim {
    /// Decode the IR integer form, where `-1` marks a dynamic dimension.
    pub fn from_ir(value: i64) -> Result<Self, ShapeParseError> {
        match value {
            -1 => Ok(Dim::Dynamic),
            v if v >= 0 => Ok(Dim::Static(v as u64)),
            v => Err(ShapeParseError::NegativeDim(v)),
        }
    }

    pub fn is_static(self) -> bool {
        matches!(self, Dim::Static(_))
    }

    pub fn get(self) -> Option<u64> {
        match self {
            Dim::Static(v) => Some(v),
            Dim::Dynamic => None,
        }
    }
}

impl fmt::Display for Dim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dim::Static(v) => write!(f, "{v}"),
            Dim::Dynamic => f.write_str("?"),
        }
    }
}

impl From<u64> for Dim {
    fn from(v: u64) -> Self {
        Dim::Static(v)
    }
}

/// Errors raised while decoding shapes from IR text
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShapeParseError {
    #[error("negative dimension {0} (only -1 may mark a dynamic dimension)")]
    NegativeDim(i64),
    #[error("invalid dimension '{0}'")]
    InvalidDim(String),
}

/// Ordered list of dimensions; an empty shape is a scalar
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Shape {
    dims: Vec<Dim>,
}

impl Shape {
    pub fn new(dims: Vec<Dim>) -> Self {
        Self { dims }
    }

    pub fn scalar() -> Self {
        Self { dims: Vec::new() }
    }

    /// Build a fully static shape from plain extents.
    pub fn from_static(extents: &[u64]) -> Self {
        Self { dims: extents.iter().map(|&d| Dim::Static(d)).collect() }
    }

    /// Build a shape from IR `dims` values, mapping `-1` to [`Dim::Dynamic`].
    pub fn from_ir_dims(values: &[i64]) -> Result<Self, ShapeParseError> {
        let dims = values.iter().map(|&v| Dim::from_ir(v)).collect::<Result<_, _>>()?;
        Ok(Self { dims })
    }

    /// Parse the comma-separated attribute form: `"1,8,16"`, `"?,3"`, `"-1,3"`.
    /// An empty (or blank) string is a scalar.
    pub fn parse(text: &str) -> Result<Self, ShapeParseError> {
        let text = text.trim().trim_start_matches('[').trim_end_matches(']').trim();
        if text.is_empty() {
            return Ok(Self::scalar());
        }
        let dims = text
            .split(',')
            .map(|tok| {
                let tok = tok.trim();
                if tok == "?" {
                    return Ok(Dim::Dynamic);
                }
                let v: i64 = tok.parse().map_err(|_| ShapeParseError::InvalidDim(tok.to_string()))?;
                Dim::from_ir(v)
            })
            .collect::<Result<_, _>>()?;
        Ok(Self { dims })
    }

    pub fn dims(&self) -> &[Dim] {
        &self.dims
    }

    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    pub fn is_static(&self) -> bool {
        self.dims.iter().all(|d| d.is_static())
    }

    /// Element count, if every dimension is static and the product fits in a `u64`.
    pub fn num_elements(&self) -> Option<u64> {
        self.dims.iter().try_fold(1u64, |acc, d| acc.checked_mul(d.get()?))
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, d) in self.dims.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{d}")?;
        }
        f.write_str("]")
    }
}

impl FromStr for Shape {
    type Err = ShapeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Shape::parse(s)
    }
}

impl From<Vec<Dim>> for Shape {
    fn from(dims: Vec<Dim>) -> Self {
        Shape::new(dims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_type_names_round_trip() {
        for &et in ElementType::ALL {
            assert_eq!(ElementType::from_ir_name(et.ir_name()), Some(et));
        }
        assert_eq!(ElementType::from_ir_name("f32"), Some(ElementType::F32));
        assert_eq!(ElementType::from_ir_name("boolean"), None);
        assert_eq!(ElementType::F16.size_in_bytes(), 2);
        assert!(ElementType::BF16.is_float());
        assert!(!ElementType::I64.is_float());
    }

    #[test]
    fn parse_attribute_shapes() {
        assert_eq!(Shape::parse("1,8,16").unwrap(), Shape::from_static(&[1, 8, 16]));
        assert_eq!(
            Shape::parse(" ?, 3 ").unwrap(),
            Shape::new(vec![Dim::Dynamic, Dim::Static(3)])
        );
        assert_eq!(Shape::parse("-1,3").unwrap(), Shape::parse("?,3").unwrap());
        assert_eq!(Shape::parse("").unwrap(), Shape::scalar());
        assert_eq!(Shape::parse("[2,2]").unwrap(), Shape::from_static(&[2, 2]));

        assert_eq!(Shape::parse("1,x"), Err(ShapeParseError::InvalidDim("x".into())));
        assert_eq!(Shape::parse("1,-4"), Err(ShapeParseError::NegativeDim(-4)));
    }

    #[test]
    fn display_and_counts() {
        let s = Shape::from_ir_dims(&[1, -1, 16]).unwrap();
        assert_eq!(s.to_string(), "[1,?,16]");
        assert_eq!(s.rank(), 3);
        assert!(!s.is_static());
        assert_eq!(s.num_elements(), None);

        assert_eq!(Shape::from_static(&[2, 3, 4]).num_elements(), Some(24));
        assert_eq!(Shape::scalar().num_elements(), Some(1));
        assert_eq!(Shape::scalar().to_string(), "[]");

        let huge = Shape::from_static(&[u64::MAX / 2, 3]);
        assert_eq!(huge.num_elements(), None);
        assert_eq!(Shape::from_static(&[u64::MAX, 1]).num_elements(), Some(u64::MAX));
    }

    #[test]
    fn generated_file_matches_template() {
        let types: serde_yaml::Value =
            serde_yaml::from_str(include_str!("../../supported_types.yaml")).unwrap();
        let env = minijinja::Environment::new();
        let tmpl = env
            .template_from_str(include_str!("../templates/element_types.jinja"))
            .unwrap();
        let rendered = tmpl
            .render(minijinja::context! { types => types["types"].clone() })
            .unwrap();

        assert_eq!(rendered.trim_end(), include_str!("generated_element_types.rs").trim_end());
        assert!(rendered.contains("ElementType::F32 => true,"));
        assert!(rendered.contains("ElementType::Bool => false,"));
        assert!(!rendered.contains("True") && !rendered.contains("False"));
    }
}
