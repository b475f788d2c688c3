use core::fmt;
use std::{borrow::Cow, ops::Deref};

use ecow::EcoString;

/// An error that can occur during the serialization process.
#[derive(Clone)]
pub struct Error(Box<Repr>);

#[derive(Clone)]
enum Repr {
    /// The visitor table has no entry for a node kind.
    UnsupportedNode(EcoString),
    /// The visitor table has no entry for a mark kind.
    UnsupportedMark(EcoString),
    /// A list item was rendered outside of any list.
    NoActiveList,
    /// A node appeared under a parent that cannot hold it.
    MisplacedNode {
        kind: EcoString,
        parent: Option<EcoString>,
    },
    /// A node or mark is missing a required attribute, or it has the wrong
    /// shape.
    Attribute {
        kind: EcoString,
        name: &'static str,
    },
    /// Just a message.
    Msg(Cow<'static, str>),
}

impl Error {
    /// Creates an error for a node kind that has no visitor.
    pub fn unsupported_node(kind: impl Into<EcoString>) -> Self {
        Error(Box::new(Repr::UnsupportedNode(kind.into())))
    }

    /// Creates an error for a mark kind that has no formatter.
    pub fn unsupported_mark(kind: impl Into<EcoString>) -> Self {
        Error(Box::new(Repr::UnsupportedMark(kind.into())))
    }

    /// Creates an error for a list item rendered without an active list.
    pub fn no_active_list() -> Self {
        Error(Box::new(Repr::NoActiveList))
    }

    /// Creates an error for a node that cannot appear under its parent.
    pub fn misplaced_node(kind: impl Into<EcoString>, parent: Option<&str>) -> Self {
        Error(Box::new(Repr::MisplacedNode {
            kind: kind.into(),
            parent: parent.map(EcoString::from),
        }))
    }

    /// Creates an error for a missing or malformed attribute.
    pub fn attribute(kind: impl Into<EcoString>, name: &'static str) -> Self {
        Error(Box::new(Repr::Attribute {
            kind: kind.into(),
            name,
        }))
    }

    /// Whether the error is caused by an unknown node or mark kind.
    pub fn is_unsupported(&self) -> bool {
        matches!(
            self.0.deref(),
            Repr::UnsupportedNode(..) | Repr::UnsupportedMark(..)
        )
    }

    /// Whether the error is caused by a list item outside of a list.
    pub fn is_no_active_list(&self) -> bool {
        matches!(self.0.deref(), Repr::NoActiveList)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.deref() {
            Repr::UnsupportedNode(kind) => {
                write!(f, "node type `{kind}` is not supported by the docx serializer")
            }
            Repr::UnsupportedMark(kind) => {
                write!(f, "mark type `{kind}` is not supported by the docx serializer")
            }
            Repr::NoActiveList => write!(f, "trying to create a list item without a list"),
            Repr::MisplacedNode {
                kind,
                parent: Some(parent),
            } => write!(f, "node type `{kind}` cannot appear inside `{parent}`"),
            Repr::MisplacedNode { kind, parent: None } => {
                write!(f, "node type `{kind}` cannot appear at the document root")
            }
            Repr::Attribute { kind, name } => {
                write!(f, "`{kind}` has a missing or malformed attribute `{name}`")
            }
            Repr::Msg(s) => write!(f, "{s}"),
        }
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        <Self as fmt::Display>::fmt(self, f)
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error(Box::new(Repr::Msg(e.to_string().into())))
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error(Box::new(Repr::Msg(e.to_string().into())))
    }
}

impl From<&'static str> for Error {
    fn from(s: &'static str) -> Self {
        Error(Box::new(Repr::Msg(s.into())))
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error(Box::new(Repr::Msg(s.into())))
    }
}

impl From<Cow<'static, str>> for Error {
    fn from(s: Cow<'static, str>) -> Self {
        Error(Box::new(Repr::Msg(s)))
    }
}
