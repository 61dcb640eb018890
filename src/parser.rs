//! Column type names parsed with nom.
//!
//! Accepts the semantic type names used by [`Blueprint::column`]
//! (case-insensitive), plus a few common aliases:
//!
//! ```text
//! uuid  string  text  integer | int  bigint | biginteger | big_integer
//! boolean | bool  timestamp  date  json  decimal(<precision>, <scale>)
//! ```
//!
//! [`Blueprint::column`]: crate::blueprint::Blueprint::column

use nom::{
    branch::alt,
    bytes::complete::tag_no_case,
    character::complete::{char, digit1, multispace0},
    combinator::{map_res, value},
    sequence::{delimited, pair, separated_pair},
    IResult,
};

use crate::blueprint::ColumnType;
use crate::error::{SchemaError, SchemaResult};

/// Parse a complete column type name.
pub fn parse_column_type(input: &str) -> SchemaResult<ColumnType> {
    let input = input.trim();

    match parse_type(input) {
        Ok(("", column_type)) => Ok(column_type),
        Ok((remaining, _)) => Err(SchemaError::parse(
            input.len() - remaining.len(),
            format!("Unexpected trailing content: '{}'", remaining),
        )),
        Err(e) => Err(SchemaError::parse(
            0,
            format!("Unknown column type '{}': {:?}", input, e),
        )),
    }
}

/// Parse a column type name, keeping unknown names as [`ColumnType::Custom`].
pub fn column_type_or_custom(input: &str) -> ColumnType {
    match parse_column_type(input) {
        Ok(column_type) => column_type,
        Err(e) => {
            tracing::debug!(type_name = input, error = %e, "passing column type through unchanged");
            ColumnType::Custom(input.trim().to_string())
        }
    }
}

fn parse_type(input: &str) -> IResult<&str, ColumnType> {
    alt((
        parse_decimal,
        value(ColumnType::Uuid, tag_no_case("uuid")),
        value(ColumnType::String, tag_no_case("string")),
        value(ColumnType::Text, tag_no_case("text")),
        value(ColumnType::Integer, tag_no_case("integer")),
        value(ColumnType::Integer, tag_no_case("int")),
        value(ColumnType::BigInteger, tag_no_case("biginteger")),
        value(ColumnType::BigInteger, tag_no_case("big_integer")),
        value(ColumnType::BigInteger, tag_no_case("bigint")),
        value(ColumnType::Boolean, tag_no_case("boolean")),
        value(ColumnType::Boolean, tag_no_case("bool")),
        value(ColumnType::Timestamp, tag_no_case("timestamp")),
        value(ColumnType::Date, tag_no_case("date")),
        value(ColumnType::Json, tag_no_case("json")),
    ))(input)
}

/// Parse `decimal(p,s)`, tolerating whitespace inside the parentheses.
fn parse_decimal(input: &str) -> IResult<&str, ColumnType> {
    let (input, _) = tag_no_case("decimal")(input)?;
    let (input, (precision, scale)) = delimited(
        pair(multispace0, char('(')),
        separated_pair(
            delimited(multispace0, parse_number, multispace0),
            char(','),
            delimited(multispace0, parse_number, multispace0),
        ),
        char(')'),
    )(input)?;

    Ok((input, ColumnType::Decimal { precision, scale }))
}

fn parse_number(input: &str) -> IResult<&str, u32> {
    map_res(digit1, |digits: &str| digits.parse::<u32>())(input)
}
