//! Geometry error types
//!
//! Malformed shapes are fatal when a polytope is built and are reported to
//! the caller; they are never repaired silently.

use std::fmt;
use std::io;

use crate::expr::ExpressionError;

/// The specific index that made a shape malformed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShapeDefect {
    /// A face references a vertex past the end of the vertex list
    VertexOutOfRange {
        face: usize,
        vertex: usize,
        vertex_count: usize,
    },
    /// A cell references a face past the end of the face list
    FaceOutOfRange {
        cell: usize,
        face: usize,
        face_count: usize,
    },
}

impl fmt::Display for ShapeDefect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShapeDefect::VertexOutOfRange { face, vertex, vertex_count } => write!(
                f,
                "face {} references vertex {} but there are only {} vertices",
                face, vertex, vertex_count
            ),
            ShapeDefect::FaceOutOfRange { cell, face, face_count } => write!(
                f,
                "cell {} references face {} but there are only {} faces",
                cell, face, face_count
            ),
        }
    }
}

/// Error type for building and tessellating polytopes
#[derive(Debug, Clone, PartialEq)]
pub enum GeometryError {
    /// A face or cell index is out of range
    MalformedShape(ShapeDefect),
    /// A face has too few vertices to be drawn in the requested mode
    UnsupportedFaceArity { face: usize, arity: usize },
    /// A formula surface could not be parsed
    InvalidExpression(ExpressionError),
}

impl fmt::Display for GeometryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeometryError::MalformedShape(defect) => write!(f, "Malformed shape: {}", defect),
            GeometryError::UnsupportedFaceArity { face, arity } => {
                write!(f, "Unsupported face arity: face {} has {} vertices", face, arity)
            }
            GeometryError::InvalidExpression(err) => write!(f, "Invalid expression: {}", err),
        }
    }
}

impl std::error::Error for GeometryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GeometryError::InvalidExpression(err) => Some(err),
            GeometryError::MalformedShape(_) => None,
            GeometryError::UnsupportedFaceArity { .. } => None,
        }
    }
}

impl From<ShapeDefect> for GeometryError {
    fn from(defect: ShapeDefect) -> Self {
        GeometryError::MalformedShape(defect)
    }
}

impl From<ExpressionError> for GeometryError {
    fn from(err: ExpressionError) -> Self {
        GeometryError::InvalidExpression(err)
    }
}

/// Error loading a polytope description from a RON file
#[derive(Debug)]
pub enum ShapeLoadError {
    /// IO error (file not found, permission denied, etc.)
    Io(io::Error),
    /// Parse error (invalid RON syntax)
    Parse(ron::error::SpannedError),
    /// The file parsed but describes an invalid polytope
    Geometry(GeometryError),
}

impl From<io::Error> for ShapeLoadError {
    fn from(e: io::Error) -> Self {
        ShapeLoadError::Io(e)
    }
}

impl From<ron::error::SpannedError> for ShapeLoadError {
    fn from(e: ron::error::SpannedError) -> Self {
        ShapeLoadError::Parse(e)
    }
}

impl From<GeometryError> for ShapeLoadError {
    fn from(e: GeometryError) -> Self {
        ShapeLoadError::Geometry(e)
    }
}

impl fmt::Display for ShapeLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShapeLoadError::Io(e) => write!(f, "IO error: {}", e),
            ShapeLoadError::Parse(e) => write!(f, "Parse error: {}", e),
            ShapeLoadError::Geometry(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for ShapeLoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ShapeLoadError::Io(e) => Some(e),
            ShapeLoadError::Parse(e) => Some(e),
            ShapeLoadError::Geometry(e) => Some(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_malformed_shape_display() {
        let err: GeometryError = ShapeDefect::VertexOutOfRange { face: 3, vertex: 99, vertex_count: 16 }.into();
        let msg = format!("{}", err);
        assert!(msg.contains("Malformed shape"));
        assert!(msg.contains("vertex 99"));
        assert!(msg.contains("16 vertices"));
    }

    #[test]
    fn test_face_out_of_range_display() {
        let err = GeometryError::MalformedShape(ShapeDefect::FaceOutOfRange { cell: 1, face: 40, face_count: 24 });
        assert!(format!("{}", err).contains("cell 1 references face 40"));
    }

    #[test]
    fn test_arity_display() {
        let err = GeometryError::UnsupportedFaceArity { face: 7, arity: 2 };
        assert!(format!("{}", err).contains("face 7 has 2 vertices"));
    }

    #[test]
    fn test_load_error_source() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "missing");
        let load_err: ShapeLoadError = io_err.into();
        assert!(load_err.source().is_some());
        assert!(format!("{}", load_err).contains("IO error"));

        let geo_err: ShapeLoadError = GeometryError::UnsupportedFaceArity { face: 0, arity: 1 }.into();
        assert!(matches!(geo_err, ShapeLoadError::Geometry(_)));
    }
}
