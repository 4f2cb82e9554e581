//! RDF Vocabulary Constants and CIM Namespaces for the CIMXML toolchain
//!
//! This crate provides a centralized location for the vocabulary IRIs used
//! throughout the CIMXML parser and profile registry.
//!
//! # Organization
//!
//! Constants are organized by vocabulary:
//! - `rdf` - RDF vocabulary (http://www.w3.org/1999/02/22-rdf-syntax-ns#)
//! - `rdfs` - RDFS vocabulary (http://www.w3.org/2000/01/rdf-schema#)
//! - `xsd` - XSD vocabulary (http://www.w3.org/2001/XMLSchema#)
//! - `owl` - OWL vocabulary (http://www.w3.org/2002/07/owl#)
//! - `dcat` - DCAT vocabulary (http://www.w3.org/ns/dcat#)
//! - `cims` - CIM RDF schema extensions (IEC TC57 1999)
//! - `md` - IEC 61970-552 model description header
//! - `dm` - IEC 61970-552 difference model
//! - `cim` - the CIM payload namespaces and [`cim::CimVersion`]

/// RDF vocabulary constants
pub mod rdf {
    /// RDF namespace IRI
    pub const NS: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";

    /// rdf:type IRI
    pub const TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";

    /// rdf:Statement IRI (reification)
    pub const STATEMENT: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#Statement";

    /// rdf:subject IRI (reification)
    pub const SUBJECT: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#subject";

    /// rdf:predicate IRI (reification)
    pub const PREDICATE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#predicate";

    /// rdf:object IRI (reification)
    pub const OBJECT: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#object";

    /// rdf:first IRI (RDF list head)
    pub const FIRST: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#first";

    /// rdf:rest IRI (RDF list tail)
    pub const REST: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#rest";

    /// rdf:nil IRI (RDF list terminator)
    pub const NIL: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#nil";

    /// rdf:XMLLiteral IRI
    pub const XML_LITERAL: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#XMLLiteral";

    /// rdf:langString IRI
    pub const LANG_STRING: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#langString";

    /// Local names recognized as RDF vocabulary terms.
    ///
    /// Anything else in the RDF namespace used as a type or property draws a
    /// parser warning. "nil" appears in the W3C RDF test suite.
    pub const KNOWN_TERMS: &[&str] = &[
        "Bag",
        "Seq",
        "Alt",
        "List",
        "XMLLiteral",
        "Property",
        "Statement",
        "type",
        "li",
        "subject",
        "predicate",
        "object",
        "value",
        "first",
        "rest",
        "nil",
    ];

    /// Test for a container membership local name (`_1`, `_2`, ...).
    ///
    /// The digits must not start with `0` or `-`; arbitrary magnitude is
    /// allowed.
    pub fn is_member_property_local_name(local: &str) -> bool {
        let Some(number) = local.strip_prefix('_') else {
            return false;
        };
        if number.is_empty() || number.starts_with('0') || number.starts_with('-') {
            return false;
        }
        number.bytes().all(|b| b.is_ascii_digit())
    }

    /// The rdf:_N membership property IRI for the given ordinal.
    pub fn member_property(ordinal: u32) -> String {
        format!("{NS}_{ordinal}")
    }
}

/// RDFS vocabulary constants
pub mod rdfs {
    /// RDFS namespace IRI
    pub const NS: &str = "http://www.w3.org/2000/01/rdf-schema#";

    /// rdfs:domain IRI
    pub const DOMAIN: &str = "http://www.w3.org/2000/01/rdf-schema#domain";

    /// rdfs:range IRI
    pub const RANGE: &str = "http://www.w3.org/2000/01/rdf-schema#range";

    /// rdfs:label IRI
    pub const LABEL: &str = "http://www.w3.org/2000/01/rdf-schema#label";
}

/// XSD vocabulary constants
pub mod xsd {
    /// XSD namespace IRI
    pub const NS: &str = "http://www.w3.org/2001/XMLSchema#";

    /// xsd:string IRI
    pub const STRING: &str = "http://www.w3.org/2001/XMLSchema#string";

    /// xsd:boolean IRI
    pub const BOOLEAN: &str = "http://www.w3.org/2001/XMLSchema#boolean";

    /// xsd:integer IRI
    pub const INTEGER: &str = "http://www.w3.org/2001/XMLSchema#integer";

    /// xsd:int IRI
    pub const INT: &str = "http://www.w3.org/2001/XMLSchema#int";

    /// xsd:long IRI
    pub const LONG: &str = "http://www.w3.org/2001/XMLSchema#long";

    /// xsd:short IRI
    pub const SHORT: &str = "http://www.w3.org/2001/XMLSchema#short";

    /// xsd:byte IRI
    pub const BYTE: &str = "http://www.w3.org/2001/XMLSchema#byte";

    /// xsd:unsignedByte IRI
    pub const UNSIGNED_BYTE: &str = "http://www.w3.org/2001/XMLSchema#unsignedByte";

    /// xsd:unsignedShort IRI
    pub const UNSIGNED_SHORT: &str = "http://www.w3.org/2001/XMLSchema#unsignedShort";

    /// xsd:unsignedInt IRI
    pub const UNSIGNED_INT: &str = "http://www.w3.org/2001/XMLSchema#unsignedInt";

    /// xsd:unsignedLong IRI
    pub const UNSIGNED_LONG: &str = "http://www.w3.org/2001/XMLSchema#unsignedLong";

    /// xsd:positiveInteger IRI
    pub const POSITIVE_INTEGER: &str = "http://www.w3.org/2001/XMLSchema#positiveInteger";

    /// xsd:nonNegativeInteger IRI
    pub const NON_NEGATIVE_INTEGER: &str = "http://www.w3.org/2001/XMLSchema#nonNegativeInteger";

    /// xsd:nonPositiveInteger IRI
    pub const NON_POSITIVE_INTEGER: &str = "http://www.w3.org/2001/XMLSchema#nonPositiveInteger";

    /// xsd:negativeInteger IRI
    pub const NEGATIVE_INTEGER: &str = "http://www.w3.org/2001/XMLSchema#negativeInteger";

    /// xsd:float IRI
    pub const FLOAT: &str = "http://www.w3.org/2001/XMLSchema#float";

    /// xsd:double IRI
    pub const DOUBLE: &str = "http://www.w3.org/2001/XMLSchema#double";

    /// xsd:decimal IRI
    pub const DECIMAL: &str = "http://www.w3.org/2001/XMLSchema#decimal";

    /// xsd:anyURI IRI
    pub const ANY_URI: &str = "http://www.w3.org/2001/XMLSchema#anyURI";

    /// xsd:date IRI
    pub const DATE: &str = "http://www.w3.org/2001/XMLSchema#date";

    /// xsd:time IRI
    pub const TIME: &str = "http://www.w3.org/2001/XMLSchema#time";

    /// xsd:dateTime IRI
    pub const DATE_TIME: &str = "http://www.w3.org/2001/XMLSchema#dateTime";

    /// xsd:dateTimeStamp IRI
    pub const DATE_TIME_STAMP: &str = "http://www.w3.org/2001/XMLSchema#dateTimeStamp";

    /// xsd:duration IRI
    pub const DURATION: &str = "http://www.w3.org/2001/XMLSchema#duration";

    /// xsd:dayTimeDuration IRI
    pub const DAY_TIME_DURATION: &str = "http://www.w3.org/2001/XMLSchema#dayTimeDuration";

    /// xsd:yearMonthDuration IRI
    pub const YEAR_MONTH_DURATION: &str = "http://www.w3.org/2001/XMLSchema#yearMonthDuration";

    /// xsd:gDay IRI
    pub const G_DAY: &str = "http://www.w3.org/2001/XMLSchema#gDay";

    /// xsd:gMonth IRI
    pub const G_MONTH: &str = "http://www.w3.org/2001/XMLSchema#gMonth";

    /// xsd:gMonthDay IRI
    pub const G_MONTH_DAY: &str = "http://www.w3.org/2001/XMLSchema#gMonthDay";

    /// xsd:gYear IRI
    pub const G_YEAR: &str = "http://www.w3.org/2001/XMLSchema#gYear";

    /// xsd:gYearMonth IRI
    pub const G_YEAR_MONTH: &str = "http://www.w3.org/2001/XMLSchema#gYearMonth";

    /// xsd:base64Binary IRI
    pub const BASE64_BINARY: &str = "http://www.w3.org/2001/XMLSchema#base64Binary";

    /// xsd:hexBinary IRI
    pub const HEX_BINARY: &str = "http://www.w3.org/2001/XMLSchema#hexBinary";
}

/// OWL vocabulary constants
pub mod owl {
    /// OWL namespace IRI
    pub const NS: &str = "http://www.w3.org/2002/07/owl#";

    /// owl:Ontology IRI
    pub const ONTOLOGY: &str = "http://www.w3.org/2002/07/owl#Ontology";

    /// owl:versionIRI IRI
    pub const VERSION_IRI: &str = "http://www.w3.org/2002/07/owl#versionIRI";

    /// owl:versionInfo IRI
    pub const VERSION_INFO: &str = "http://www.w3.org/2002/07/owl#versionInfo";
}

/// DCAT vocabulary constants
pub mod dcat {
    /// DCAT namespace IRI
    pub const NS: &str = "http://www.w3.org/ns/dcat#";

    /// dcat:keyword IRI
    pub const KEYWORD: &str = "http://www.w3.org/ns/dcat#keyword";
}

/// CIM RDF schema extension vocabulary (IEC TC57, 1999)
pub mod cims {
    /// cims namespace IRI
    pub const NS: &str = "http://iec.ch/TC57/1999/rdf-schema-extensions-19990926#";

    /// cims:dataType IRI
    pub const DATA_TYPE: &str =
        "http://iec.ch/TC57/1999/rdf-schema-extensions-19990926#dataType";

    /// cims:stereotype IRI
    pub const STEREOTYPE: &str =
        "http://iec.ch/TC57/1999/rdf-schema-extensions-19990926#stereotype";

    /// cims:isFixed IRI
    pub const IS_FIXED: &str =
        "http://iec.ch/TC57/1999/rdf-schema-extensions-19990926#isFixed";

    /// cims:AssociationUsed IRI
    pub const ASSOCIATION_USED: &str =
        "http://iec.ch/TC57/1999/rdf-schema-extensions-19990926#AssociationUsed";

    /// cims:ClassCategory IRI
    pub const CLASS_CATEGORY: &str =
        "http://iec.ch/TC57/1999/rdf-schema-extensions-19990926#ClassCategory";
}

/// IEC 61970-552 model description header vocabulary
pub mod md {
    /// Model description namespace IRI
    pub const NS: &str = "http://iec.ch/TC57/61970-552/ModelDescription/1#";

    /// md:FullModel class IRI (also the header graph name for full models)
    pub const FULL_MODEL: &str = "http://iec.ch/TC57/61970-552/ModelDescription/1#FullModel";

    /// md:Model.profile IRI
    pub const MODEL_PROFILE: &str =
        "http://iec.ch/TC57/61970-552/ModelDescription/1#Model.profile";

    /// md:Model.Supersedes IRI
    pub const MODEL_SUPERSEDES: &str =
        "http://iec.ch/TC57/61970-552/ModelDescription/1#Model.Supersedes";

    /// md:Model.DependentOn IRI
    pub const MODEL_DEPENDENT_ON: &str =
        "http://iec.ch/TC57/61970-552/ModelDescription/1#Model.DependentOn";

    /// Local name of the full model class
    pub const LOCAL_FULL_MODEL: &str = "FullModel";
}

/// IEC 61970-552 difference model vocabulary
pub mod dm {
    /// Difference model namespace IRI
    pub const NS: &str = "http://iec.ch/TC57/61970-552/DifferenceModel/1#";

    /// dm:DifferenceModel class IRI (also the header graph name for
    /// difference models)
    pub const DIFFERENCE_MODEL: &str =
        "http://iec.ch/TC57/61970-552/DifferenceModel/1#DifferenceModel";

    /// Graph name for the forward differences container
    pub const FORWARD_DIFFERENCES: &str =
        "http://iec.ch/TC57/61970-552/DifferenceModel/1#forwardDifferences";

    /// Graph name for the reverse differences container
    pub const REVERSE_DIFFERENCES: &str =
        "http://iec.ch/TC57/61970-552/DifferenceModel/1#reverseDifferences";

    /// Graph name for the preconditions container
    pub const PRECONDITIONS: &str =
        "http://iec.ch/TC57/61970-552/DifferenceModel/1#preconditions";

    /// Local name of the difference model class
    pub const LOCAL_DIFFERENCE_MODEL: &str = "DifferenceModel";

    /// Local names of the difference containers
    pub const LOCAL_FORWARD_DIFFERENCES: &str = "forwardDifferences";
    pub const LOCAL_REVERSE_DIFFERENCES: &str = "reverseDifferences";
    pub const LOCAL_PRECONDITIONS: &str = "preconditions";
}

/// CIM payload namespaces and version detection
pub mod cim {
    /// CIM 16 namespace IRI (CGMES v2.4.15)
    pub const NS_CIM16: &str = "http://iec.ch/TC57/2013/CIM-schema-cim16#";

    /// CIM 17 namespace IRI (CGMES v3.0)
    pub const NS_CIM17: &str = "http://iec.ch/TC57/CIM100#";

    /// CIM 18 namespace IRI
    pub const NS_CIM18: &str = "https://cim.ucaiug.io/ns#";

    /// CIM versions known to this library.
    ///
    /// The version is identified by the namespace bound to the `cim` prefix
    /// of a document or graph.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
    pub enum CimVersion {
        /// No CIM namespace bound
        NoCim,
        /// CIM version 16 (CGMES v2.4.15)
        Cim16,
        /// CIM version 17 (CGMES v3.0)
        Cim17,
        /// CIM version 18 (no matching CGMES release yet)
        Cim18,
    }

    impl CimVersion {
        /// Get the CIM version for a given `cim` namespace IRI.
        ///
        /// Returns [`CimVersion::NoCim`] for unrecognized namespaces.
        pub fn from_namespace(namespace: &str) -> CimVersion {
            match namespace {
                NS_CIM16 => CimVersion::Cim16,
                NS_CIM17 => CimVersion::Cim17,
                NS_CIM18 => CimVersion::Cim18,
                _ => CimVersion::NoCim,
            }
        }
    }

    impl std::fmt::Display for CimVersion {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            let name = match self {
                CimVersion::NoCim => "NO_CIM",
                CimVersion::Cim16 => "CIM_16",
                CimVersion::Cim17 => "CIM_17",
                CimVersion::Cim18 => "CIM_18",
            };
            write!(f, "{name}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cim_version_from_namespace() {
        assert_eq!(
            cim::CimVersion::from_namespace("http://iec.ch/TC57/2013/CIM-schema-cim16#"),
            cim::CimVersion::Cim16
        );
        assert_eq!(
            cim::CimVersion::from_namespace("http://iec.ch/TC57/CIM100#"),
            cim::CimVersion::Cim17
        );
        assert_eq!(
            cim::CimVersion::from_namespace("https://cim.ucaiug.io/ns#"),
            cim::CimVersion::Cim18
        );
        assert_eq!(
            cim::CimVersion::from_namespace("http://example.org/not-cim#"),
            cim::CimVersion::NoCim
        );
    }

    #[test]
    fn test_member_property_local_names() {
        assert!(rdf::is_member_property_local_name("_1"));
        assert!(rdf::is_member_property_local_name("_42"));
        // larger than u32/u64 is still a member property
        assert!(rdf::is_member_property_local_name(
            "_99999999999999999999999999"
        ));
        assert!(!rdf::is_member_property_local_name("_0"));
        assert!(!rdf::is_member_property_local_name("_-1"));
        assert!(!rdf::is_member_property_local_name("_"));
        assert!(!rdf::is_member_property_local_name("first"));
    }

    #[test]
    fn test_member_property_iri() {
        assert_eq!(
            rdf::member_property(3),
            "http://www.w3.org/1999/02/22-rdf-syntax-ns#_3"
        );
    }

    #[test]
    fn test_header_graph_names_share_class_iris() {
        assert_eq!(md::FULL_MODEL, format!("{}{}", md::NS, md::LOCAL_FULL_MODEL));
        assert_eq!(
            dm::DIFFERENCE_MODEL,
            format!("{}{}", dm::NS, dm::LOCAL_DIFFERENCE_MODEL)
        );
    }
}
