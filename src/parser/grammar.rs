use crate::error::ParseError;
use crate::types::{
    EnumType, EnumValue, ExtendDeclaration, ExtensionsRange, Field, Label, MessageType, Method,
    ProtoFile, Service, Type, MAX_TAG_VALUE,
};
use crate::value::{OptionMap, OptionValue, ProtoOption};

use super::scanner::Scanner;

/// Where in the file a declaration appears. Some keywords are only legal in
/// certain scopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Context {
    File,
    Message,
    Enum,
    Extend,
    Service,
}

impl Context {
    fn permits_file_keyword(self) -> bool {
        self == Context::File
    }

    fn permits_field(self) -> bool {
        matches!(self, Context::Message | Context::Extend)
    }

    fn permits_extensions(self) -> bool {
        self == Context::Message
    }

    fn permits_rpc(self) -> bool {
        self == Context::Service
    }
}

/// One parsed declaration, handed back to the enclosing body loop, which
/// decides where it belongs (or rejects it).
enum Declaration {
    /// A stray `;` or a construct consumed without producing a value.
    None,
    Type(Type),
    Service(Service),
    Extend(ExtendDeclaration),
    Option(ProtoOption),
    Field(Field),
    EnumValue(EnumValue),
    Method(Method),
    Extensions(ExtensionsRange),
}

pub(crate) struct Parser<'a> {
    scanner: Scanner<'a>,
    file_name: &'a str,
    package: Option<String>,
    imports: Vec<String>,
    public_imports: Vec<String>,
    types: Vec<Type>,
    services: Vec<Service>,
    options: OptionMap,
    extend_declarations: Vec<ExtendDeclaration>,
}

impl<'a> Parser<'a> {
    pub fn new(file_name: &'a str, source: &'a str) -> Self {
        Parser {
            scanner: Scanner::new(file_name, source),
            file_name,
            package: None,
            imports: Vec::new(),
            public_imports: Vec::new(),
            types: Vec::new(),
            services: Vec::new(),
            options: OptionMap::new(),
            extend_declarations: Vec::new(),
        }
    }

    pub fn parse(mut self) -> Result<ProtoFile, ParseError> {
        loop {
            let documentation = self.scanner.collect_documentation()?;
            if self.scanner.is_at_end() {
                return Ok(ProtoFile {
                    file_name: self.file_name.to_string(),
                    package: self.package,
                    imports: self.imports,
                    public_imports: self.public_imports,
                    types: self.types,
                    services: self.services,
                    options: self.options,
                    extend_declarations: self.extend_declarations,
                });
            }
            let prefix = match &self.package {
                Some(package) => format!("{}.", package),
                None => String::new(),
            };
            match self.declaration(documentation, Context::File, &prefix)? {
                Declaration::Type(t) => self.types.push(t),
                Declaration::Service(s) => self.services.push(s),
                Declaration::Extend(e) => self.extend_declarations.push(e),
                Declaration::Option(o) => self.options.insert_merging(o.name, o.value),
                Declaration::None => {}
                _ => return Err(self.scanner.err("unexpected declaration at file scope")),
            }
        }
    }

    fn declaration(
        &mut self,
        documentation: String,
        context: Context,
        prefix: &str,
    ) -> Result<Declaration, ParseError> {
        // Stray semicolons show up after nested closing braces in the wild.
        if self.scanner.eat_char(';')? {
            return Ok(Declaration::None);
        }
        let label = self.scanner.read_word()?;
        match label.as_str() {
            "syntax" if context.permits_file_keyword() => {
                // Recognised for forward compatibility and discarded.
                self.scanner.expect_char('=')?;
                self.scanner.read_quoted_string()?;
                self.scanner.expect_char(';')?;
                Ok(Declaration::None)
            }
            "package" if context.permits_file_keyword() => {
                if self.package.is_some() {
                    return Err(self.scanner.err("too many package names"));
                }
                self.package = Some(self.scanner.read_word()?);
                self.scanner.expect_char(';')?;
                Ok(Declaration::None)
            }
            "import" if context.permits_file_keyword() => {
                if self.scanner.peek_char()? == '"' {
                    let path = self.scanner.read_quoted_string()?;
                    self.imports.push(path);
                } else {
                    let modifier = self.scanner.read_word()?;
                    if modifier != "public" {
                        return Err(self
                            .scanner
                            .err(format!("expected \"public\" but was {}", modifier)));
                    }
                    let path = self.scanner.read_quoted_string()?;
                    self.public_imports.push(path);
                }
                self.scanner.expect_char(';')?;
                Ok(Declaration::None)
            }
            "option" => {
                let option = self.option('=')?;
                self.scanner.expect_char(';')?;
                Ok(Declaration::Option(option))
            }
            "message" => Ok(Declaration::Type(Type::Message(
                self.message(documentation, prefix)?,
            ))),
            "enum" => Ok(Declaration::Type(Type::Enum(
                self.enum_type(documentation, prefix)?,
            ))),
            "service" => Ok(Declaration::Service(self.service(documentation, prefix)?)),
            "extend" => Ok(Declaration::Extend(self.extend(documentation)?)),
            "rpc" if context.permits_rpc() => {
                Ok(Declaration::Method(self.method(documentation)?))
            }
            "extensions" if context.permits_extensions() => Ok(Declaration::Extensions(
                self.extensions_range(documentation)?,
            )),
            "required" | "optional" | "repeated" if context.permits_field() => {
                let label = match label.as_str() {
                    "required" => Label::Required,
                    "optional" => Label::Optional,
                    _ => Label::Repeated,
                };
                Ok(Declaration::Field(self.field(documentation, label)?))
            }
            _ if context == Context::Enum => Ok(Declaration::EnumValue(
                self.enum_value(label, documentation)?,
            )),
            _ => Err(self.scanner.err(format!("unexpected label: {}", label))),
        }
    }

    fn message(&mut self, documentation: String, prefix: &str) -> Result<MessageType, ParseError> {
        let name = self.scanner.read_word()?;
        let qualified_name = format!("{}{}", prefix, name);
        let nested_prefix = format!("{}.", qualified_name);

        let mut fields = Vec::new();
        let mut nested_types = Vec::new();
        let mut extensions = Vec::new();
        let mut options = Vec::new();

        self.scanner.expect_char('{')?;
        loop {
            let entry_documentation = self.scanner.collect_documentation()?;
            if self.scanner.eat_char('}')? {
                break;
            }
            match self.declaration(entry_documentation, Context::Message, &nested_prefix)? {
                Declaration::Field(field) => fields.push(field),
                Declaration::Type(nested) => nested_types.push(nested),
                Declaration::Extensions(range) => extensions.push(range),
                Declaration::Option(option) => options.push(option),
                // Extend blocks always land at file scope, however deeply
                // they were nested.
                Declaration::Extend(extend) => self.extend_declarations.push(extend),
                Declaration::None => {}
                _ => return Err(self.scanner.err("unexpected declaration in message")),
            }
        }

        Ok(MessageType {
            name,
            qualified_name,
            documentation,
            fields,
            nested_types,
            extensions,
            options,
        })
    }

    fn enum_type(&mut self, documentation: String, prefix: &str) -> Result<EnumType, ParseError> {
        let name = self.scanner.read_word()?;
        let qualified_name = format!("{}{}", prefix, name);
        let mut values = Vec::new();

        self.scanner.expect_char('{')?;
        loop {
            let value_documentation = self.scanner.collect_documentation()?;
            if self.scanner.eat_char('}')? {
                break;
            }
            match self.declaration(value_documentation, Context::Enum, prefix)? {
                Declaration::EnumValue(value) => values.push(value),
                // Enum-level options parse but have no home in the model.
                Declaration::Option(_) => {}
                Declaration::None => {}
                _ => return Err(self.scanner.err("unexpected declaration in enum")),
            }
        }

        Ok(EnumType {
            name,
            qualified_name,
            documentation,
            values,
        })
    }

    fn enum_value(&mut self, name: String, documentation: String) -> Result<EnumValue, ParseError> {
        self.scanner.expect_char('=')?;
        let tag = self.scanner.read_int()?;
        let options = if self.scanner.peek_char()? == '[' {
            self.option_list()?
        } else {
            Vec::new()
        };
        self.scanner.expect_char(';')?;
        let documentation = self.with_trailing_documentation(documentation);
        Ok(EnumValue {
            name,
            tag,
            documentation,
            options,
        })
    }

    fn field(&mut self, documentation: String, label: Label) -> Result<Field, ParseError> {
        let type_name = self.scanner.read_word()?;
        let name = self.scanner.read_word()?;
        self.scanner.expect_char('=')?;
        let tag = self.scanner.read_int()?;
        if tag <= 0 {
            return Err(self
                .scanner
                .err(format!("expected tag > 0, but was {}", tag)));
        }
        let options = if self.scanner.peek_char()? == '[' {
            self.option_list()?
        } else {
            Vec::new()
        };
        self.scanner.expect_char(';')?;
        let documentation = self.with_trailing_documentation(documentation);
        Ok(Field {
            label,
            type_name,
            name,
            tag,
            documentation,
            options,
        })
    }

    fn service(&mut self, documentation: String, prefix: &str) -> Result<Service, ParseError> {
        let name = self.scanner.read_word()?;
        let qualified_name = format!("{}{}", prefix, name);
        let mut methods = Vec::new();

        self.scanner.expect_char('{')?;
        loop {
            let method_documentation = self.scanner.collect_documentation()?;
            if self.scanner.eat_char('}')? {
                break;
            }
            match self.declaration(method_documentation, Context::Service, prefix)? {
                Declaration::Method(method) => methods.push(method),
                Declaration::Option(_) => {}
                Declaration::None => {}
                _ => return Err(self.scanner.err("unexpected declaration in service")),
            }
        }

        Ok(Service {
            name,
            qualified_name,
            documentation,
            methods,
        })
    }

    fn method(&mut self, documentation: String) -> Result<Method, ParseError> {
        let name = self.scanner.read_word()?;
        self.scanner.expect_char('(')?;
        let request_type = self.scanner.read_word()?;
        self.scanner.expect_char(')')?;
        let returns = self.scanner.read_word()?;
        if returns != "returns" {
            return Err(self
                .scanner
                .err(format!("expected \"returns\" but was {}", returns)));
        }
        self.scanner.expect_char('(')?;
        let response_type = self.scanner.read_word()?;
        self.scanner.expect_char(')')?;

        let mut options = OptionMap::new();
        if self.scanner.peek_char()? == '{' {
            self.scanner.expect_char('{')?;
            loop {
                if self.scanner.eat_char('}')? {
                    break;
                }
                let word = self.scanner.read_word()?;
                if word != "option" {
                    return Err(self
                        .scanner
                        .err(format!("expected \"option\" but was {}", word)));
                }
                let option = self.option('=')?;
                self.scanner.expect_char(';')?;
                options.insert_merging(option.name, option.value);
            }
            Ok(Method {
                name,
                documentation,
                request_type,
                response_type,
                options,
            })
        } else {
            self.scanner.expect_char(';')?;
            let documentation = self.with_trailing_documentation(documentation);
            Ok(Method {
                name,
                documentation,
                request_type,
                response_type,
                options,
            })
        }
    }

    fn extend(&mut self, documentation: String) -> Result<ExtendDeclaration, ParseError> {
        let name = self.scanner.read_word()?;
        // Extend targets qualify against the package, not the lexical
        // scope; already-dotted names are taken as written.
        let qualified_name = if name.contains('.') {
            name.clone()
        } else {
            match &self.package {
                Some(package) => format!("{}.{}", package, name),
                None => name.clone(),
            }
        };
        let mut fields = Vec::new();

        self.scanner.expect_char('{')?;
        loop {
            let field_documentation = self.scanner.collect_documentation()?;
            if self.scanner.eat_char('}')? {
                break;
            }
            match self.declaration(field_documentation, Context::Extend, "")? {
                Declaration::Field(field) => fields.push(field),
                Declaration::None => {}
                _ => return Err(self.scanner.err("unexpected declaration in extend")),
            }
        }

        Ok(ExtendDeclaration {
            name,
            qualified_name,
            documentation,
            fields,
        })
    }

    fn extensions_range(
        &mut self,
        documentation: String,
    ) -> Result<ExtensionsRange, ParseError> {
        let start = self.scanner.read_int()?;
        let mut end = start;
        if self.scanner.peek_char()? != ';' {
            let keyword = self.scanner.read_word()?;
            if keyword != "to" {
                return Err(self
                    .scanner
                    .err(format!("expected \"to\" but was {}", keyword)));
            }
            let bound = self.scanner.read_word()?;
            end = if bound == "max" {
                MAX_TAG_VALUE
            } else {
                self.scanner.int_value(&bound)?
            };
        }
        self.scanner.expect_char(';')?;
        Ok(ExtensionsRange {
            start,
            end,
            documentation,
        })
    }

    /// The bracketed option list after a field or enum value tag:
    /// `[a = 1, (b).c = 2]`. Separators are optional and trailing commas
    /// are accepted.
    fn option_list(&mut self) -> Result<Vec<ProtoOption>, ParseError> {
        self.scanner.expect_char('[')?;
        let mut options = Vec::new();
        loop {
            if self.scanner.eat_char(']')? {
                return Ok(options);
            }
            if self.scanner.eat_char(',')? {
                continue;
            }
            options.push(self.option('=')?);
        }
    }

    /// One `name = value` (or `name: value` inside aggregates). Names may
    /// be wrapped in parens, which are stripped, or brackets, which are
    /// kept; a dotted suffix after the wrapper nests the value one
    /// aggregate deeper.
    fn option(&mut self, key_value_separator: char) -> Result<ProtoOption, ParseError> {
        let is_bracketed = self.scanner.peek_char()? == '[';
        let mut name = self.option_name()?;
        if is_bracketed {
            name = format!("[{}]", name);
        }
        let sub_name = if self.scanner.eat_char('.')? {
            Some(self.scanner.read_word()?)
        } else {
            None
        };
        self.scanner.expect_char(key_value_separator)?;
        let value = self.option_value()?;
        let value = match sub_name {
            Some(sub_name) => {
                OptionValue::Map([(sub_name, value)].into_iter().collect())
            }
            None => value,
        };
        Ok(ProtoOption { name, value })
    }

    fn option_name(&mut self) -> Result<String, ParseError> {
        match self.scanner.peek_char()? {
            '(' => {
                self.scanner.expect_char('(')?;
                let name = self.scanner.read_word()?;
                self.scanner.expect_char(')')?;
                Ok(name)
            }
            '[' => {
                self.scanner.expect_char('[')?;
                let name = self.scanner.read_word()?;
                self.scanner.expect_char(']')?;
                Ok(name)
            }
            _ => self.scanner.read_word(),
        }
    }

    fn option_value(&mut self) -> Result<OptionValue, ParseError> {
        match self.scanner.peek_char()? {
            '{' => Ok(OptionValue::Map(self.aggregate()?)),
            '[' => Ok(OptionValue::List(self.value_list()?)),
            '"' => Ok(OptionValue::Scalar(self.scanner.read_quoted_string()?)),
            _ => Ok(OptionValue::Scalar(self.scanner.read_word()?)),
        }
    }

    /// `{k: v k2: v2}`: commas and newlines are interchangeable
    /// separators, trailing separators are fine, and a repeated key folds
    /// its values into a list.
    fn aggregate(&mut self) -> Result<OptionMap, ParseError> {
        self.scanner.expect_char('{')?;
        let mut map = OptionMap::new();
        loop {
            if self.scanner.eat_char('}')? {
                return Ok(map);
            }
            if self.scanner.eat_char(',')? {
                continue;
            }
            let entry = self.option(':')?;
            map.insert_folding(entry.name, entry.value);
        }
    }

    fn value_list(&mut self) -> Result<Vec<OptionValue>, ParseError> {
        self.scanner.expect_char('[')?;
        let mut values = Vec::new();
        loop {
            if self.scanner.eat_char(']')? {
                return Ok(values);
            }
            if self.scanner.eat_char(',')? {
                continue;
            }
            values.push(self.option_value()?);
        }
    }

    /// Join a same-line trailing comment onto leading documentation.
    fn with_trailing_documentation(&mut self, leading: String) -> String {
        match self.scanner.trailing_comment() {
            Some(trailing) if leading.is_empty() => trailing,
            Some(trailing) => format!("{}\n{}", leading, trailing),
            None => leading,
        }
    }
}
