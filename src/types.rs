use crate::value::{OptionMap, OptionValue, ProtoOption};

/// Highest tag number usable on the wire, `2^29 - 1`. The `max` keyword in
/// an extensions range maps to this value.
pub const MAX_TAG_VALUE: i32 = (1 << 29) - 1;

/// A parsed `.proto` file.
///
/// Owns every declaration in the file; all nested entities are reachable
/// from here and nothing is shared. Values are immutable once the parser
/// returns them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtoFile {
    /// Logical file name this tree was parsed from.
    pub file_name: String,
    /// The `package` declaration, if any.
    pub package: Option<String>,
    /// Paths of plain `import` statements, in source order.
    pub imports: Vec<String>,
    /// Paths of `import public` statements, in source order.
    pub public_imports: Vec<String>,
    /// Top-level messages and enums, in source order.
    pub types: Vec<Type>,
    /// Top-level services, in source order.
    pub services: Vec<Service>,
    /// File-level options.
    pub options: OptionMap,
    /// Extend declarations, including those nested inside messages.
    pub extend_declarations: Vec<ExtendDeclaration>,
}

/// A named type declaration: either a message or an enum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Type {
    Message(MessageType),
    Enum(EnumType),
}

impl Type {
    /// Simple (unqualified) name of the type.
    pub fn name(&self) -> &str {
        match self {
            Type::Message(m) => &m.name,
            Type::Enum(e) => &e.name,
        }
    }

    /// Fully-qualified name, composed from the enclosing package and
    /// message scopes.
    pub fn qualified_name(&self) -> &str {
        match self {
            Type::Message(m) => &m.qualified_name,
            Type::Enum(e) => &e.qualified_name,
        }
    }

    /// Documentation attached to the declaration, empty if none.
    pub fn documentation(&self) -> &str {
        match self {
            Type::Message(m) => &m.documentation,
            Type::Enum(e) => &e.documentation,
        }
    }

    /// Get as a message, returns `None` for enums.
    pub fn as_message(&self) -> Option<&MessageType> {
        match self {
            Type::Message(m) => Some(m),
            Type::Enum(_) => None,
        }
    }

    /// Get as an enum, returns `None` for messages.
    pub fn as_enum(&self) -> Option<&EnumType> {
        match self {
            Type::Enum(e) => Some(e),
            Type::Message(_) => None,
        }
    }
}

/// A `message` declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageType {
    pub name: String,
    pub qualified_name: String,
    pub documentation: String,
    /// Fields in source order.
    pub fields: Vec<Field>,
    /// Messages and enums declared inside this message.
    pub nested_types: Vec<Type>,
    /// `extensions` ranges reserved for external extenders.
    pub extensions: Vec<ExtensionsRange>,
    /// Message-level `option` statements.
    pub options: Vec<ProtoOption>,
}

/// Presence label preceding a field type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Label {
    Required,
    Optional,
    Repeated,
}

impl Label {
    /// The keyword as written in schema source.
    pub fn keyword(self) -> &'static str {
        match self {
            Label::Required => "required",
            Label::Optional => "optional",
            Label::Repeated => "repeated",
        }
    }
}

/// A field declaration inside a message or extend block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub label: Label,
    /// Type name as written in source; never resolved at this layer.
    pub type_name: String,
    pub name: String,
    /// Wire tag, always positive.
    pub tag: i32,
    pub documentation: String,
    /// Options from the bracketed list after the tag, in source order.
    pub options: Vec<ProtoOption>,
}

impl Field {
    /// The options collapsed into a mapping view. Repeated names with
    /// aggregate values merge their sub-mappings, so `(x).a = 1` and
    /// `(x).b = 2` read back as `x -> {a: 1, b: 2}`.
    pub fn options_as_map(&self) -> OptionMap {
        ProtoOption::as_map(&self.options)
    }

    /// Value of the option named `default`, if present.
    pub fn default_value(&self) -> Option<&OptionValue> {
        self.options
            .iter()
            .find(|o| o.name == "default")
            .map(|o| &o.value)
    }

    /// True iff the field carries a `deprecated` option with value `true`.
    pub fn is_deprecated(&self) -> bool {
        self.options
            .iter()
            .find(|o| o.name == "deprecated")
            .map_or(false, |o| o.value.as_scalar() == Some("true"))
    }
}

/// An `enum` declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumType {
    pub name: String,
    pub qualified_name: String,
    pub documentation: String,
    /// Constants in source order.
    pub values: Vec<EnumValue>,
}

/// A single constant inside an enum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumValue {
    pub name: String,
    pub tag: i32,
    pub documentation: String,
    /// Options from the bracketed list after the tag, in source order.
    pub options: Vec<ProtoOption>,
}

/// A `service` declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Service {
    pub name: String,
    pub qualified_name: String,
    pub documentation: String,
    /// Rpc methods in source order.
    pub methods: Vec<Method>,
}

/// An `rpc` method inside a service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Method {
    pub name: String,
    pub documentation: String,
    /// Request type name as written in source.
    pub request_type: String,
    /// Response type name as written in source.
    pub response_type: String,
    /// Options from the method body, if it had one.
    pub options: OptionMap,
}

/// An `extend` block adding fields to a message declared elsewhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtendDeclaration {
    /// Target type name as written in source.
    pub name: String,
    /// Target name qualified against the file's package when the source
    /// name was not already dotted.
    pub qualified_name: String,
    pub documentation: String,
    pub fields: Vec<Field>,
}

/// An `extensions` range reserving tags for external extenders.
///
/// `extensions 500;` yields `start == end == 500`; `extensions 1000 to
/// max;` yields `end == MAX_TAG_VALUE`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionsRange {
    pub start: i32,
    pub end: i32,
    pub documentation: String,
}
