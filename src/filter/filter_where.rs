use serde_json::Value;

use super::error::FilterError;
use super::filter::Filter;
use super::types::FilterOp;

/// Builds the body of a WHERE clause from structured JSON conditions.
///
/// Conditions combine with AND at each object level. Keys starting with `$`
/// are logical operators (`$and`, `$or`, `$not`); everything else is a column
/// name, validated before quoting. Values bind as `$N` placeholders.
pub struct FilterWhere {
    param_values: Vec<Value>,
    param_index: usize,
}

impl FilterWhere {
    /// Generate SQL for `where_data`, numbering placeholders from
    /// `starting_param_index + 1`. An empty or null object yields an empty
    /// string; callers omit the WHERE keyword in that case.
    pub fn generate(
        where_data: &Value,
        starting_param_index: usize,
    ) -> Result<(String, Vec<Value>), FilterError> {
        let mut builder = Self {
            param_values: vec![],
            param_index: starting_param_index,
        };
        let sql = builder.walk(where_data, 0)?;
        Ok((sql, builder.param_values))
    }

    pub fn validate(where_data: &Value) -> Result<(), FilterError> {
        match where_data {
            Value::Null | Value::Object(_) => Ok(()),
            _ => Err(FilterError::InvalidWhereClause(
                "WHERE must be a JSON object".to_string(),
            )),
        }
    }

    fn walk(&mut self, data: &Value, depth: u32) -> Result<String, FilterError> {
        let max_depth = crate::config::CONFIG.filter.max_nested_depth;
        if depth > max_depth {
            return Err(FilterError::NestedTooDeep(max_depth));
        }

        match data {
            Value::Null => Ok(String::new()),
            Value::Object(obj) => {
                let mut parts = Vec::new();
                for (key, value) in obj {
                    if key.starts_with('$') {
                        parts.push(self.logical_operator(key, value, depth)?);
                    } else {
                        parts.push(self.field_condition(key, value)?);
                    }
                }
                Ok(parts.join(" AND "))
            }
            _ => Err(FilterError::InvalidWhereClause(
                "Unsupported WHERE format".to_string(),
            )),
        }
    }

    fn logical_operator(&mut self, op: &str, value: &Value, depth: u32) -> Result<String, FilterError> {
        match op {
            "$and" | "$or" => {
                let arr = value.as_array().ok_or_else(|| {
                    FilterError::InvalidOperatorData(format!("{} requires an array", op))
                })?;
                if arr.is_empty() {
                    return Err(FilterError::InvalidOperatorData(format!(
                        "{} requires a non-empty array",
                        op
                    )));
                }
                let mut branches = Vec::new();
                for entry in arr {
                    let sql = self.walk(entry, depth + 1)?;
                    if sql.is_empty() {
                        return Err(FilterError::InvalidOperatorData(format!(
                            "{} entries must contain conditions",
                            op
                        )));
                    }
                    branches.push(format!("({})", sql));
                }
                let joiner = if op == "$and" { " AND " } else { " OR " };
                Ok(format!("({})", branches.join(joiner)))
            }
            "$not" => {
                let sql = self.walk(value, depth + 1)?;
                if sql.is_empty() {
                    return Err(FilterError::InvalidOperatorData(
                        "$not requires conditions".to_string(),
                    ));
                }
                Ok(format!("NOT ({})", sql))
            }
            other => Err(FilterError::UnsupportedOperator(other.to_string())),
        }
    }

    fn field_condition(&mut self, column: &str, value: &Value) -> Result<String, FilterError> {
        Filter::validate_column_name(column)?;

        if let Value::Object(ops) = value {
            let mut parts = Vec::new();
            for (op_key, op_val) in ops {
                let op = Self::map_operator(op_key)?;
                parts.push(self.sql_condition(column, op, op_val)?);
            }
            if parts.is_empty() {
                return Err(FilterError::InvalidOperatorData(format!(
                    "No operator given for column {}",
                    column
                )));
            }
            Ok(parts.join(" AND "))
        } else {
            // Implicit equality: { field: value }
            self.sql_condition(column, FilterOp::Eq, value)
        }
    }

    fn map_operator(op_key: &str) -> Result<FilterOp, FilterError> {
        Ok(match op_key {
            "$eq" => FilterOp::Eq,
            "$ne" | "$neq" => FilterOp::Ne,
            "$gt" => FilterOp::Gt,
            "$gte" => FilterOp::Gte,
            "$lt" => FilterOp::Lt,
            "$lte" => FilterOp::Lte,
            "$like" => FilterOp::Like,
            "$ilike" => FilterOp::ILike,
            "$in" => FilterOp::In,
            "$nin" => FilterOp::NotIn,
            other => return Err(FilterError::UnsupportedOperator(other.to_string())),
        })
    }

    fn sql_condition(&mut self, column: &str, op: FilterOp, data: &Value) -> Result<String, FilterError> {
        let quoted = format!("\"{}\"", column);
        Ok(match op {
            FilterOp::Eq => {
                if data.is_null() {
                    format!("{} IS NULL", quoted)
                } else {
                    format!("{} = {}", quoted, self.param(data.clone()))
                }
            }
            FilterOp::Ne => {
                if data.is_null() {
                    format!("{} IS NOT NULL", quoted)
                } else {
                    format!("{} <> {}", quoted, self.param(data.clone()))
                }
            }
            FilterOp::Gt => format!("{} > {}", quoted, self.param(data.clone())),
            FilterOp::Gte => format!("{} >= {}", quoted, self.param(data.clone())),
            FilterOp::Lt => format!("{} < {}", quoted, self.param(data.clone())),
            FilterOp::Lte => format!("{} <= {}", quoted, self.param(data.clone())),
            FilterOp::Like => format!("{} LIKE {}", quoted, self.param(data.clone())),
            FilterOp::ILike => format!("{} ILIKE {}", quoted, self.param(data.clone())),
            FilterOp::In | FilterOp::NotIn => {
                if let Value::Array(values) = data {
                    if values.is_empty() {
                        // No candidate values: IN matches nothing, NOT IN everything
                        if op == FilterOp::In {
                            return Ok("1=0".to_string());
                        }
                        return Ok("1=1".to_string());
                    }
                    let params: Vec<String> =
                        values.iter().map(|v| self.param(v.clone())).collect();
                    let keyword = if op == FilterOp::In { "IN" } else { "NOT IN" };
                    format!("{} {} ({})", quoted, keyword, params.join(", "))
                } else {
                    return Err(FilterError::InvalidOperatorData(
                        "$in/$nin require an array".to_string(),
                    ));
                }
            }
        })
    }

    fn param(&mut self, value: Value) -> String {
        self.param_values.push(value);
        self.param_index += 1;
        format!("${}", self.param_index)
    }
}
