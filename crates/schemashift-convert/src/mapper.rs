use schemashift_core::{
    Attribute, ColumnKind, EnumRegistry, FieldDeclaration, MappedField, Result, TargetType,
    member_name,
};
use schemashift_extract::{ColumnExpr, Dialect, Value, parse_column_expr};

use crate::options::IdentityPolicy;

/// Converts field expressions into target types and attributes.
#[derive(Debug, Clone, Copy)]
pub struct TypeMapper<'a> {
    dialect: &'a dyn Dialect,
    identity: IdentityPolicy,
}

impl<'a> TypeMapper<'a> {
    pub fn new(dialect: &'a dyn Dialect, identity: IdentityPolicy) -> Self {
        Self { dialect, identity }
    }

    /// Map one field, registering any enumeration it declares.
    ///
    /// Expressions that fail to parse or match no rule become
    /// [`TargetType::Unmapped`] fields. The only error is an enum conflict
    /// rejected by the registry.
    pub fn map_field(
        &self,
        field: &FieldDeclaration,
        enums: &mut EnumRegistry,
    ) -> Result<MappedField> {
        let expr = match parse_column_expr(&field.expression) {
            Ok(expr) => expr,
            Err(err) => {
                tracing::debug!(
                    event = "expression_unparsed",
                    field = %field.name,
                    line = field.line,
                    error = %err
                );
                return Ok(unmapped(field));
            }
        };

        let kind = self.dialect.column_kind(expr.type_name());
        let mapped = if expr.has("primaryKey") {
            Some(self.identity_field(&field.name, kind, &expr))
        } else {
            match kind {
                Some(kind) => scalar_field(&field.name, kind, &expr, enums)?,
                None => None,
            }
        };

        let mut mapped = mapped.unwrap_or_else(|| unmapped(field));

        if let Some(column) = expr.column_name() {
            if column != field.name {
                mapped.attributes.push(Attribute::Map(column.to_string()));
            }
        }

        if !expr.has("notNull") {
            mapped.mark_optional();
        }

        Ok(mapped)
    }

    fn identity_field(&self, name: &str, kind: Option<ColumnKind>, expr: &ColumnExpr) -> MappedField {
        let autoincrement =
            expr.has("autoincrement") || kind.is_some_and(ColumnKind::implies_autoincrement);

        let keeps_integer = match kind {
            Some(kind) if autoincrement && kind.is_large_integer() => Some(TargetType::BigInt),
            Some(ColumnKind::Integer | ColumnKind::Serial)
                if autoincrement && self.identity == IdentityPolicy::Preserve =>
            {
                Some(TargetType::Int)
            }
            _ => None,
        };

        match keeps_integer {
            Some(field_type) => MappedField::new(name, field_type)
                .with_attribute(Attribute::Id)
                .with_attribute(Attribute::DefaultAutoincrement),
            None => {
                let field = MappedField::new(name, TargetType::String)
                    .with_attribute(Attribute::Id)
                    .with_attribute(Attribute::DefaultUuid);
                if kind == Some(ColumnKind::Uuid) {
                    field.with_attribute(Attribute::Uuid)
                } else {
                    field
                }
            }
        }
    }
}

fn unmapped(field: &FieldDeclaration) -> MappedField {
    MappedField::new(
        field.name.as_str(),
        TargetType::Unmapped {
            raw: field.expression.clone(),
        },
    )
    .optional()
}

fn scalar_field(
    name: &str,
    kind: ColumnKind,
    expr: &ColumnExpr,
    enums: &mut EnumRegistry,
) -> Result<Option<MappedField>> {
    let default = expr.default_value();

    let field = match kind {
        ColumnKind::Integer | ColumnKind::Serial => {
            let mut field = MappedField::new(name, TargetType::Int);
            if kind == ColumnKind::Serial {
                field.attributes.push(Attribute::DefaultAutoincrement);
            } else if expr.has("notNull") {
                if let Some(Value::Number(value)) = default {
                    if is_integer_literal(value) {
                        field.attributes.push(Attribute::DefaultInt(value.clone()));
                    }
                }
            }
            field
        }
        ColumnKind::BigInt | ColumnKind::BigSerial => {
            let field = MappedField::new(name, TargetType::BigInt);
            if kind == ColumnKind::BigSerial {
                field.with_attribute(Attribute::DefaultAutoincrement)
            } else {
                field
            }
        }
        ColumnKind::VarChar | ColumnKind::Char => {
            let mut field = MappedField::new(name, TargetType::String);
            if let Some(length) = expr.option("length").and_then(Value::as_u32) {
                field.attributes.push(if kind == ColumnKind::Char {
                    Attribute::Char(length)
                } else {
                    Attribute::VarChar(length)
                });
            }
            if let Some(Value::Str(value) | Value::Number(value)) = default {
                field.attributes.push(Attribute::DefaultString(value.clone()));
            }
            if expr.has("unique") {
                field.attributes.push(Attribute::Unique);
            }
            field
        }
        ColumnKind::Text => MappedField::new(name, TargetType::String),
        ColumnKind::Boolean => {
            let field = MappedField::new(name, TargetType::Boolean);
            match default {
                Some(Value::Bool(value)) => field.with_attribute(Attribute::DefaultBool(*value)),
                _ => field,
            }
        }
        ColumnKind::Decimal => {
            let mut field = MappedField::new(name, TargetType::Decimal);
            if let Some(precision) = expr.option("precision").and_then(Value::as_u32) {
                let scale = expr.option("scale").and_then(Value::as_u32).unwrap_or(0);
                field
                    .attributes
                    .push(Attribute::DecimalPrecision(precision, scale));
            }
            if let Some(Value::Str(value) | Value::Number(value)) = default {
                if is_decimal_literal(value) {
                    field.attributes.push(Attribute::DefaultDecimal(value.clone()));
                }
            }
            field
        }
        ColumnKind::Json => MappedField::new(name, TargetType::Json),
        ColumnKind::Timestamp => {
            let field = MappedField::new(name, TargetType::DateTime);
            let now = expr.has("defaultNow") || default.is_some_and(is_now_expression);
            let on_update =
                expr.has("onUpdateNow") || expr.has("$onUpdate") || expr.has("$onUpdateFn");
            match (now, on_update) {
                (true, true) => field.with_attribute(Attribute::DefaultNowUpdatedAt),
                (true, false) => field.with_attribute(Attribute::DefaultNow),
                (false, true) => field.with_attribute(Attribute::UpdatedAt),
                (false, false) => field,
            }
        }
        ColumnKind::Enum => return enum_field(name, expr, enums),
        ColumnKind::Uuid => {
            let field = MappedField::new(name, TargetType::String).with_attribute(Attribute::Uuid);
            if expr.has("defaultRandom") {
                field.with_attribute(Attribute::DefaultUuid)
            } else {
                field
            }
        }
    };

    Ok(Some(field))
}

fn enum_field(
    name: &str,
    expr: &ColumnExpr,
    enums: &mut EnumRegistry,
) -> Result<Option<MappedField>> {
    let (Some(enum_name), Some(Value::Array(items))) = (expr.column_name(), expr.base.args.get(1))
    else {
        return Ok(None);
    };
    let values: Vec<String> = items
        .iter()
        .filter_map(Value::as_str)
        .map(str::to_string)
        .collect();
    if values.is_empty() || values.len() != items.len() {
        return Ok(None);
    }

    let canonical = enums.register(enum_name, &values)?;
    let mut field = MappedField::new(name, TargetType::Enum(canonical.clone()));

    if let Some(Value::Str(value)) = expr.default_value() {
        if !values.contains(value) {
            tracing::warn!(
                event = "enum_default_unknown",
                field = %name,
                enum_name = %canonical,
                value = %value
            );
        }
        field.attributes.push(Attribute::DefaultEnum(member_name(value)));
    }

    Ok(Some(field))
}

fn is_now_expression(value: &Value) -> bool {
    match value {
        Value::Opaque(text) => {
            let lower = text.to_ascii_lowercase();
            lower.contains("current_timestamp") || lower.contains("now()")
        }
        _ => false,
    }
}

fn is_integer_literal(value: &str) -> bool {
    let digits = value.strip_prefix('-').unwrap_or(value);
    !digits.is_empty() && digits.chars().all(|ch| ch.is_ascii_digit())
}

fn is_decimal_literal(value: &str) -> bool {
    let digits = value.strip_prefix('-').unwrap_or(value);
    let mut parts = digits.splitn(2, '.');
    let whole = parts.next().unwrap_or_default();
    let fraction = parts.next();
    !whole.is_empty()
        && whole.chars().all(|ch| ch.is_ascii_digit())
        && fraction.is_none_or(|part| !part.is_empty() && part.chars().all(|ch| ch.is_ascii_digit()))
}
