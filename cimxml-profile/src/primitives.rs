//! Default mapping from CIM primitive type names to RDF datatypes

use cimxml_graph::Datatype;
use cimxml_vocab::{rdf, xsd};
use rustc_hash::FxHashMap;

/// The built-in CIM primitive type table.
///
/// Keys are the `rdfs:label` values of `cims:stereotype "Primitive"` classes
/// as they appear in the profile ontologies. `StringIRI` and `IRI` map to
/// `xsd:string` for historical reasons; new profiles use `URI`, which maps
/// to `xsd:anyURI` and makes the parser emit IRI terms instead of literals.
pub fn builtin_primitive_table() -> FxHashMap<String, Datatype> {
    let entries: &[(&str, &str)] = &[
        ("Base64Binary", xsd::BASE64_BINARY),
        ("Boolean", xsd::BOOLEAN),
        ("Byte", xsd::BYTE),
        ("Date", xsd::DATE),
        ("DateTime", xsd::DATE_TIME),
        ("DateTimeStamp", xsd::DATE_TIME_STAMP),
        ("Day", xsd::G_DAY),
        ("DayTimeDuration", xsd::DAY_TIME_DURATION),
        ("Decimal", xsd::DECIMAL),
        ("Double", xsd::DOUBLE),
        ("Duration", xsd::DURATION),
        ("Float", xsd::FLOAT),
        ("HexBinary", xsd::HEX_BINARY),
        ("Int", xsd::INT),
        ("Integer", xsd::INTEGER),
        ("IRI", xsd::STRING),
        ("LangString", rdf::LANG_STRING),
        ("Long", xsd::LONG),
        ("Month", xsd::G_MONTH),
        ("MonthDay", xsd::G_MONTH_DAY),
        ("NegativeInteger", xsd::NEGATIVE_INTEGER),
        ("NonNegativeInteger", xsd::NON_NEGATIVE_INTEGER),
        ("NonPositiveInteger", xsd::NON_POSITIVE_INTEGER),
        ("PositiveInteger", xsd::POSITIVE_INTEGER),
        ("Short", xsd::SHORT),
        ("String", xsd::STRING),
        ("StringFixedLanguage", xsd::STRING),
        ("StringIRI", xsd::STRING),
        ("Time", xsd::TIME),
        ("UnsignedByte", xsd::UNSIGNED_BYTE),
        ("UnsignedInt", xsd::UNSIGNED_INT),
        ("UnsignedLong", xsd::UNSIGNED_LONG),
        ("UnsignedShort", xsd::UNSIGNED_SHORT),
        ("URI", xsd::ANY_URI),
        ("UUID", xsd::STRING),
        ("Version", xsd::STRING),
        ("Year", xsd::G_YEAR),
        ("YearMonth", xsd::G_YEAR_MONTH),
        ("YearMonthDuration", xsd::YEAR_MONTH_DURATION),
        ("gDay", xsd::G_DAY),
        ("gMonth", xsd::G_MONTH),
        ("gMonthDay", xsd::G_MONTH_DAY),
        ("gYear", xsd::G_YEAR),
        ("gYearMonth", xsd::G_YEAR_MONTH),
    ];
    entries
        .iter()
        .map(|(name, iri)| (name.to_string(), Datatype::from_iri(iri)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_table() {
        let table = builtin_primitive_table();
        assert_eq!(table.get("Boolean").unwrap().as_iri(), xsd::BOOLEAN);
        assert_eq!(table.get("Float").unwrap().as_iri(), xsd::FLOAT);
        assert_eq!(table.get("Short").unwrap().as_iri(), xsd::SHORT);
        // Historical string mappings.
        assert_eq!(table.get("StringIRI").unwrap().as_iri(), xsd::STRING);
        assert_eq!(table.get("IRI").unwrap().as_iri(), xsd::STRING);
        assert_eq!(table.get("UUID").unwrap().as_iri(), xsd::STRING);
        // URI triggers IRI-term creation downstream.
        assert_eq!(table.get("URI").unwrap().as_iri(), xsd::ANY_URI);
        assert_eq!(table.get("LangString").unwrap().as_iri(), rdf::LANG_STRING);
        assert!(table.get("NoSuchPrimitive").is_none());
    }
}
