//! Endpoint definitions: the validated, immutable form of one declaration.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use super::error::DefinitionError;

/// Prefix every dynamic endpoint is mounted under.
pub const API_BASE_PATH: &str = "/api/";

/// Declared type of a single field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Integer,
    Long,
    Double,
    Float,
    Boolean,
    Character,
    Byte,
    Short,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Long => "long",
            Self::Double => "double",
            Self::Float => "float",
            Self::Boolean => "boolean",
            Self::Character => "character",
            Self::Byte => "byte",
            Self::Short => "short",
        }
    }
}

impl FromStr for FieldType {
    type Err = DefinitionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "string" | "word" => Ok(Self::String),
            "integer" | "number" | "int" => Ok(Self::Integer),
            "long" => Ok(Self::Long),
            "double" => Ok(Self::Double),
            "float" => Ok(Self::Float),
            "boolean" => Ok(Self::Boolean),
            "character" => Ok(Self::Character),
            "byte" => Ok(Self::Byte),
            "short" => Ok(Self::Short),
            _ => Err(DefinitionError::UnsupportedType(s.to_string())),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// HTTP verbs a declaration may name. Only the CRUD four are ever routed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Head,
    Post,
    Put,
    Patch,
    Delete,
    Options,
    Trace,
}

impl HttpMethod {
    /// Verbs the `all` shorthand expands to.
    pub const CRUD: [HttpMethod; 4] = [Self::Get, Self::Post, Self::Put, Self::Delete];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Head => "HEAD",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
            Self::Options => "OPTIONS",
            Self::Trace => "TRACE",
        }
    }
}

impl FromStr for HttpMethod {
    type Err = DefinitionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "HEAD" => Ok(Self::Head),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "PATCH" => Ok(Self::Patch),
            "DELETE" => Ok(Self::Delete),
            "OPTIONS" => Ok(Self::Options),
            "TRACE" => Ok(Self::Trace),
            other => Err(DefinitionError::UnsupportedMethod(other.to_string())),
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Non-empty set of allowed verbs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MethodSet(BTreeSet<HttpMethod>);

impl MethodSet {
    /// Parses `"GET, POST"` style lists or the `all` shorthand.
    pub fn parse(input: &str) -> Result<Self, DefinitionError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(DefinitionError::EmptyMethods);
        }
        if trimmed.eq_ignore_ascii_case("all") {
            return Ok(Self(HttpMethod::CRUD.into_iter().collect()));
        }

        let methods = trimmed
            .split(',')
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(HttpMethod::from_str)
            .collect::<Result<BTreeSet<_>, _>>()?;

        if methods.is_empty() {
            return Err(DefinitionError::NoValidMethods(input.to_string()));
        }
        Ok(Self(methods))
    }

    pub fn contains(&self, method: HttpMethod) -> bool {
        self.0.contains(&method)
    }

    pub fn iter(&self) -> impl Iterator<Item = HttpMethod> + '_ {
        self.0.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for MethodSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.0.iter().map(HttpMethod::as_str).collect();
        f.write_str(&names.join(","))
    }
}

/// Validated description of one mock endpoint.
///
/// Built once from a declaration and never mutated afterwards. Fields are
/// kept in a `BTreeMap` so every generated record serializes its keys in
/// the same order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EndpointDefinition {
    name: String,
    endpoint_name: String,
    fields: BTreeMap<String, FieldType>,
    methods: MethodSet,
    count: i64,
}

impl EndpointDefinition {
    pub fn new(
        name: impl Into<String>,
        endpoint_name: impl Into<String>,
        fields: &BTreeMap<String, String>,
        methods: &str,
        count: i64,
    ) -> Result<Self, DefinitionError> {
        let endpoint_name = endpoint_name.into();
        validate_endpoint_name(&endpoint_name)?;

        let fields = fields
            .iter()
            .map(|(field, type_name)| {
                type_name
                    .parse::<FieldType>()
                    .map(|ty| (field.clone(), ty))
                    .map_err(|_| DefinitionError::UnsupportedFieldType {
                        field: field.clone(),
                        type_name: type_name.clone(),
                    })
            })
            .collect::<Result<BTreeMap<_, _>, _>>()?;

        Ok(Self {
            name: name.into(),
            endpoint_name,
            fields,
            methods: MethodSet::parse(methods)?,
            count,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn endpoint_name(&self) -> &str {
        &self.endpoint_name
    }

    pub fn fields(&self) -> &BTreeMap<String, FieldType> {
        &self.fields
    }

    pub fn methods(&self) -> &MethodSet {
        &self.methods
    }

    pub fn count(&self) -> i64 {
        self.count
    }

    /// `/api/<endpointName>`
    pub fn base_path(&self) -> String {
        format!("{}{}", API_BASE_PATH, self.endpoint_name)
    }

    pub fn allows(&self, method: HttpMethod) -> bool {
        self.methods.contains(method)
    }
}

impl fmt::Display for EndpointDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "EndpointDefinition{{endpoint='{}', count={}, fields={}, methods='{}'}}",
            self.endpoint_name,
            self.count,
            self.fields.len(),
            self.methods
        )
    }
}

/// An endpoint name must be exactly one URL path segment.
///
/// Dot-only names are dot segments and get normalized away by clients.
pub fn validate_endpoint_name(endpoint_name: &str) -> Result<(), DefinitionError> {
    if endpoint_name.trim().is_empty() {
        return Err(DefinitionError::EmptyEndpoint);
    }
    let valid = endpoint_name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '~'))
        && !endpoint_name.chars().all(|c| c == '.');
    if !valid {
        return Err(DefinitionError::InvalidEndpoint(endpoint_name.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_field_type_aliases() {
        assert_eq!("word".parse::<FieldType>().unwrap(), FieldType::String);
        assert_eq!("Number".parse::<FieldType>().unwrap(), FieldType::Integer);
        assert_eq!("INT".parse::<FieldType>().unwrap(), FieldType::Integer);
        assert_eq!("short".parse::<FieldType>().unwrap(), FieldType::Short);
        assert!("uuid".parse::<FieldType>().is_err());
    }

    #[test]
    fn test_methods_all_expands_to_crud() {
        let methods = MethodSet::parse(" ALL ").unwrap();
        assert_eq!(methods.len(), 4);
        for m in HttpMethod::CRUD {
            assert!(methods.contains(m));
        }
        assert!(!methods.contains(HttpMethod::Patch));
    }

    #[test]
    fn test_methods_comma_list() {
        let methods = MethodSet::parse("get, post ,").unwrap();
        assert!(methods.contains(HttpMethod::Get));
        assert!(methods.contains(HttpMethod::Post));
        assert!(!methods.contains(HttpMethod::Delete));
        assert_eq!(methods.to_string(), "GET,POST");
    }

    #[test]
    fn test_methods_rejects_garbage() {
        assert!(matches!(MethodSet::parse(""), Err(DefinitionError::EmptyMethods)));
        assert!(matches!(MethodSet::parse(" , "), Err(DefinitionError::NoValidMethods(_))));
        assert!(matches!(
            MethodSet::parse("GET,FETCH"),
            Err(DefinitionError::UnsupportedMethod(m)) if m == "FETCH"
        ));
    }

    #[test]
    fn test_definition_construction() {
        let def = EndpointDefinition::new(
            "Users",
            "users",
            &fields(&[("name", "string"), ("age", "integer")]),
            "GET,POST",
            3,
        )
        .unwrap();

        assert_eq!(def.base_path(), "/api/users");
        assert_eq!(def.fields()["age"], FieldType::Integer);
        assert!(def.allows(HttpMethod::Post));
        assert!(!def.allows(HttpMethod::Put));
        assert_eq!(def.count(), 3);
    }

    #[test]
    fn test_definition_unknown_type_fails() {
        let err = EndpointDefinition::new("X", "x", &fields(&[("id", "uuid")]), "all", 1)
            .unwrap_err();
        assert!(err.to_string().contains("uuid"));
    }

    #[test]
    fn test_endpoint_name_must_be_single_segment() {
        assert!(validate_endpoint_name("users").is_ok());
        assert!(validate_endpoint_name("user-profiles_v2").is_ok());
        assert!(validate_endpoint_name("").is_err());
        assert!(validate_endpoint_name("users/1").is_err());
        assert!(validate_endpoint_name(":id").is_err());
    }

    #[test]
    fn test_endpoint_name_rejects_dot_segments() {
        assert!(matches!(
            validate_endpoint_name("."),
            Err(DefinitionError::InvalidEndpoint(_))
        ));
        assert!(validate_endpoint_name("..").is_err());
        assert!(validate_endpoint_name("...").is_err());
        assert!(validate_endpoint_name("v1.0").is_ok());
        assert!(validate_endpoint_name(".well-known").is_ok());
        assert!(EndpointDefinition::new("Up", "..", &BTreeMap::new(), "all", 1).is_err());
    }
}
