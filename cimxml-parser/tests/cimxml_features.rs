//! End-to-end coverage of the IEC 61970-552 extensions: model headers,
//! UUID normalization, difference models, and profile-driven literal typing.

use cimxml_graph::{Datatype, GraphView, Term, Triple, TriplePattern, DEFAULT_GRAPH_IRI};
use cimxml_parser::{run_parse, CimXmlReader, CimXmlSink, CollectingErrorHandler, DatasetSink};
use cimxml_vocab::{dm, md, rdf, xsd};

const CIM: &str = "http://iec.ch/TC57/CIM100#";

fn iri(value: &str) -> Term {
    Term::iri(value)
}

fn cim(local: &str) -> Term {
    Term::iri(format!("{CIM}{local}"))
}

#[test]
fn full_model_header() {
    let cimxml = r#"<?xml version="1.0" encoding="utf-8"?>
        <rdf:RDF xmlns:cim="http://iec.ch/TC57/CIM100#"
                 xmlns:md="http://iec.ch/TC57/61970-552/ModelDescription/1#"
                 xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#">
         <md:FullModel rdf:about="urn:uuid:08984e27-811f-4042-9125-1531ae0de0f6">
           <md:Model.Supersedes rdf:resource="urn:uuid:f086bea4-3428-4e49-8214-752fdeb1e2e4"/>
           <md:Model.DependentOn rdf:resource="urn:uuid:fa274c8c-a346-4080-ba5a-8a4eaa9083f9"/>
           <md:Model.profile>http://iec.ch/TC57/ns/CIM/CoreEquipment-EU/3.0</md:Model.profile>
           <md:Model.profile>http://iec.ch/TC57/ns/CIM/MyCIMProfile/3.0</md:Model.profile>
         </md:FullModel>
        </rdf:RDF>"#;

    let dataset = CimXmlReader::new().parse_cim_model_str(cimxml).unwrap();
    assert!(dataset.is_full_model());
    assert!(!dataset.is_difference_model());

    let header = dataset.model_header().unwrap();
    assert_eq!(
        header.model().unwrap(),
        iri("urn:uuid:08984e27-811f-4042-9125-1531ae0de0f6")
    );
    // Exactly one subject of the declared type.
    let typed: Vec<_> = header
        .graph()
        .find(&TriplePattern::with_po(
            Term::iri(rdf::TYPE),
            Term::iri(md::FULL_MODEL),
        ))
        .collect();
    assert_eq!(typed.len(), 1);

    assert_eq!(header.supersedes().unwrap().len(), 1);
    assert_eq!(header.dependent_on().unwrap().len(), 1);

    let profiles = header.profiles().unwrap();
    assert_eq!(profiles.len(), 2);
    assert!(profiles.contains(&Term::string("http://iec.ch/TC57/ns/CIM/CoreEquipment-EU/3.0")));
    assert!(profiles.contains(&Term::string("http://iec.ch/TC57/ns/CIM/MyCIMProfile/3.0")));
}

#[test]
fn uuid_normalization_of_id_about_and_resource() {
    let cimxml = r##"<?xml version="1.0" encoding="utf-8"?>
        <rdf:RDF xmlns:cim="http://iec.ch/TC57/CIM100#"
                 xmlns:md="http://iec.ch/TC57/61970-552/ModelDescription/1#"
                 xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#">
         <md:FullModel rdf:about="urn:uuid:08984e27-811f-4042-9125-1531ae0de0f6">
           <md:Model.profile>http://example.org/P/1.0</md:Model.profile>
         </md:FullModel>
         <cim:MyEquipment rdf:ID="_f67fc354-9e39-4191-a456-67537399bc48">
           <cim:MyEquipment.Other rdf:resource="#_d597b77b-c8c4-4d88-883e-f516eedb913b"/>
         </cim:MyEquipment>
         <cim:MyEquipment rdf:about="#_d597b77b-c8c4-4d88-883e-f516eedb913b">
           <cim:IdentifiedObject.name>other</cim:IdentifiedObject.name>
         </cim:MyEquipment>
        </rdf:RDF>"##;

    let dataset = CimXmlReader::new().parse_cim_model_str(cimxml).unwrap();
    let body = dataset.body().unwrap();

    assert!(body.contains(&Triple::new(
        iri("urn:uuid:f67fc354-9e39-4191-a456-67537399bc48"),
        Term::iri(rdf::TYPE),
        cim("MyEquipment"),
    )));
    assert!(body.contains(&Triple::new(
        iri("urn:uuid:f67fc354-9e39-4191-a456-67537399bc48"),
        cim("MyEquipment.Other"),
        iri("urn:uuid:d597b77b-c8c4-4d88-883e-f516eedb913b"),
    )));
    assert!(body.contains(&Triple::new(
        iri("urn:uuid:d597b77b-c8c4-4d88-883e-f516eedb913b"),
        cim("IdentifiedObject.name"),
        Term::string("other"),
    )));
}

#[test]
fn uuid_fixups_warn() {
    let cimxml = r#"<?xml version="1.0" encoding="utf-8"?>
        <rdf:RDF xmlns:cim="http://iec.ch/TC57/CIM100#"
                 xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#">
         <cim:MyEquipment rdf:ID="_ABCDEF01-2345-6789-ABCD-EF0123456789">
           <cim:IdentifiedObject.name>upper</cim:IdentifiedObject.name>
         </cim:MyEquipment>
         <cim:MyEquipment rdf:ID="_abcdef0123456789abcdef0123456789">
           <cim:IdentifiedObject.name>dashless</cim:IdentifiedObject.name>
         </cim:MyEquipment>
        </rdf:RDF>"#;

    let mut sink = DatasetSink::new();
    let mut handler = CollectingErrorHandler::default();
    run_parse(cimxml.as_bytes(), None, None, &mut sink, &mut handler).unwrap();
    let dataset = sink.into_dataset();
    let body = dataset.graph(DEFAULT_GRAPH_IRI).unwrap();

    assert!(body.contains(&Triple::new(
        iri("urn:uuid:abcdef01-2345-6789-abcd-ef0123456789"),
        cim("IdentifiedObject.name"),
        Term::string("upper"),
    )));
    assert!(body.contains(&Triple::new(
        iri("urn:uuid:abcdef01-2345-6789-abcd-ef0123456789"),
        cim("IdentifiedObject.name"),
        Term::string("dashless"),
    )));
    assert!(handler
        .warnings
        .iter()
        .any(|(m, _)| m.contains("upper case")));
    assert!(handler
        .warnings
        .iter()
        .any(|(m, _)| m.contains("without dashes")));
}

#[test]
fn full_model_to_single_graph() {
    let cimxml = r#"<?xml version="1.0" encoding="utf-8"?>
        <rdf:RDF xmlns:cim="http://iec.ch/TC57/CIM100#"
                 xmlns:md="http://iec.ch/TC57/61970-552/ModelDescription/1#"
                 xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#">
         <md:FullModel rdf:about="urn:uuid:08984e27-811f-4042-9125-1531ae0de0f6">
           <md:Model.profile>http://example.org/CIM/MyProfile/1.1</md:Model.profile>
         </md:FullModel>
         <cim:MyEquipment rdf:ID="_f67fc354-9e39-4191-a456-67537399bc48">
           <cim:IdentifiedObject.name>My Custom Equipment</cim:IdentifiedObject.name>
         </cim:MyEquipment>
        </rdf:RDF>"#;

    let dataset = CimXmlReader::new().parse_cim_model_str(cimxml).unwrap();
    let full = dataset.full_model_to_single_graph().unwrap();
    assert_eq!(full.len(), 4);

    assert!(full.contains(&Triple::new(
        iri("urn:uuid:08984e27-811f-4042-9125-1531ae0de0f6"),
        Term::iri(rdf::TYPE),
        Term::iri(md::FULL_MODEL),
    )));
    assert!(full.contains(&Triple::new(
        iri("urn:uuid:08984e27-811f-4042-9125-1531ae0de0f6"),
        Term::iri(md::MODEL_PROFILE),
        Term::string("http://example.org/CIM/MyProfile/1.1"),
    )));
    assert!(full.contains(&Triple::new(
        iri("urn:uuid:f67fc354-9e39-4191-a456-67537399bc48"),
        Term::iri(rdf::TYPE),
        cim("MyEquipment"),
    )));
    assert!(full.contains(&Triple::new(
        iri("urn:uuid:f67fc354-9e39-4191-a456-67537399bc48"),
        cim("IdentifiedObject.name"),
        Term::string("My Custom Equipment"),
    )));

    // The union carries the header's prefixes.
    assert_eq!(full.prefixes().get("md").map(String::as_str), Some(md::NS));
}

const PREDECESSOR_FULL_MODEL: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<rdf:RDF xmlns:cim="http://iec.ch/TC57/CIM100#"
         xmlns:md="http://iec.ch/TC57/61970-552/ModelDescription/1#"
         xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#">
 <md:FullModel rdf:about="urn:uuid:d4336345-ad68-4566-afab-d9798ec5ca86">
   <md:Model.profile>http://example.org/CIM/MyProfile/1.1</md:Model.profile>
 </md:FullModel>
 <cim:MyElement rdf:ID="_135c601e-bad4-4872-ba8f-b15baf91bd2f">
   <cim:IdentifiedObject.name>Name of my element</cim:IdentifiedObject.name>
   <cim:MyElement.MyProperty>A</cim:MyElement.MyProperty>
 </cim:MyElement>
 <cim:MyElement rdf:ID="_c9fe6664-fcf0-44e6-9d20-656538b68d1c">
   <cim:IdentifiedObject.name>Name of new element to remove entirely</cim:IdentifiedObject.name>
   <cim:MyElement.MyProperty>property of new element to remove</cim:MyElement.MyProperty>
 </cim:MyElement>
 <cim:MyElement rdf:ID="_5a70f6b8-8c77-41f9-9793-6fe5bd67b756">
   <cim:IdentifiedObject.name>Name of element to remain</cim:IdentifiedObject.name>
   <cim:MyElement.MyProperty>property of new element to remain</cim:MyElement.MyProperty>
 </cim:MyElement>
</rdf:RDF>"#;

const DIFFERENCE_MODEL: &str = r##"<?xml version="1.0" encoding="utf-8"?>
<rdf:RDF
    xmlns:dm="http://iec.ch/TC57/61970-552/DifferenceModel/1#"
    xmlns:md="http://iec.ch/TC57/61970-552/ModelDescription/1#"
    xmlns:cim="http://iec.ch/TC57/CIM100#"
    xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#">
 <dm:DifferenceModel rdf:about="urn:uuid:08984e27-811f-4042-9125-1531ae0de0f6">
    <md:Model.profile>http://example.org/CIM/MyProfile/1.1</md:Model.profile>
    <md:Model.Supersedes>urn:uuid:d4336345-ad68-4566-afab-d9798ec5ca86</md:Model.Supersedes>
    <dm:preconditions rdf:parseType="Statements">

        <rdf:Description rdf:about="#_135c601e-bad4-4872-ba8f-b15baf91bd2f">
            <cim:IdentifiedObject.name>Name of my element</cim:IdentifiedObject.name>
        </rdf:Description>

    </dm:preconditions>

    <dm:forwardDifferences rdf:parseType="Statements">

        <rdf:Description rdf:about="#_135c601e-bad4-4872-ba8f-b15baf91bd2f">
            <cim:MyElement.MyProperty>B</cim:MyElement.MyProperty>
        </rdf:Description>

        <cim:MyElement rdf:about="#_2d1e4820-8858-49de-b441-5a03e7c40035">
            <cim:IdentifiedObject.name>Name of new element to add</cim:IdentifiedObject.name>
            <cim:MyElement.MyProperty>property of new element</cim:MyElement.MyProperty>
        </cim:MyElement>

    </dm:forwardDifferences>

    <dm:reverseDifferences rdf:parseType="Statements">

        <rdf:Description rdf:about="#_135c601e-bad4-4872-ba8f-b15baf91bd2f">
            <cim:MyElement.MyProperty>A</cim:MyElement.MyProperty>
        </rdf:Description>

        <cim:MyElement rdf:about="#_c9fe6664-fcf0-44e6-9d20-656538b68d1c">
            <cim:IdentifiedObject.name>Name of new element to remove entirely</cim:IdentifiedObject.name>
            <cim:MyElement.MyProperty>property of new element to remove</cim:MyElement.MyProperty>
        </cim:MyElement>

    </dm:reverseDifferences>

 </dm:DifferenceModel>
</rdf:RDF>"##;

#[test]
fn difference_model_to_full_model() {
    let reader = CimXmlReader::new();
    let predecessor = reader.parse_cim_model_str(PREDECESSOR_FULL_MODEL).unwrap();
    let difference = reader.parse_cim_model_str(DIFFERENCE_MODEL).unwrap();

    assert!(difference.is_difference_model());
    assert_eq!(difference.preconditions().unwrap().len(), 1);
    assert_eq!(difference.forward_differences().unwrap().len(), 4);
    assert_eq!(difference.reverse_differences().unwrap().len(), 4);

    let full = difference.difference_model_to_full_model(&predecessor).unwrap();
    assert_eq!(full.len(), 9);

    // The element to remain unchanged.
    assert!(full.contains(&Triple::new(
        iri("urn:uuid:5a70f6b8-8c77-41f9-9793-6fe5bd67b756"),
        Term::iri(rdf::TYPE),
        cim("MyElement"),
    )));
    assert!(full.contains(&Triple::new(
        iri("urn:uuid:5a70f6b8-8c77-41f9-9793-6fe5bd67b756"),
        cim("IdentifiedObject.name"),
        Term::string("Name of element to remain"),
    )));

    // The unchanged parts of the updated element.
    assert!(full.contains(&Triple::new(
        iri("urn:uuid:135c601e-bad4-4872-ba8f-b15baf91bd2f"),
        Term::iri(rdf::TYPE),
        cim("MyElement"),
    )));
    assert!(full.contains(&Triple::new(
        iri("urn:uuid:135c601e-bad4-4872-ba8f-b15baf91bd2f"),
        cim("IdentifiedObject.name"),
        Term::string("Name of my element"),
    )));

    // The updated property value.
    assert!(full.contains(&Triple::new(
        iri("urn:uuid:135c601e-bad4-4872-ba8f-b15baf91bd2f"),
        cim("MyElement.MyProperty"),
        Term::string("B"),
    )));
    assert!(!full.contains(&Triple::new(
        iri("urn:uuid:135c601e-bad4-4872-ba8f-b15baf91bd2f"),
        cim("MyElement.MyProperty"),
        Term::string("A"),
    )));

    // The newly added element.
    assert!(full.contains(&Triple::new(
        iri("urn:uuid:2d1e4820-8858-49de-b441-5a03e7c40035"),
        cim("IdentifiedObject.name"),
        Term::string("Name of new element to add"),
    )));

    // The removed element is gone entirely.
    assert!(!full.contains(&Triple::new(
        iri("urn:uuid:c9fe6664-fcf0-44e6-9d20-656538b68d1c"),
        Term::iri(rdf::TYPE),
        cim("MyElement"),
    )));
    assert!(!full.contains(&Triple::new(
        iri("urn:uuid:c9fe6664-fcf0-44e6-9d20-656538b68d1c"),
        cim("IdentifiedObject.name"),
        Term::string("Name of new element to remove entirely"),
    )));
}

#[test]
fn difference_application_requires_supersedes() {
    let other_predecessor = PREDECESSOR_FULL_MODEL.replace(
        "urn:uuid:d4336345-ad68-4566-afab-d9798ec5ca86",
        "urn:uuid:00000000-0000-0000-0000-000000000001",
    );
    let reader = CimXmlReader::new();
    let predecessor = reader.parse_cim_model_str(&other_predecessor).unwrap();
    let difference = reader.parse_cim_model_str(DIFFERENCE_MODEL).unwrap();
    assert!(difference
        .difference_model_to_full_model(&predecessor)
        .is_err());
}

#[test]
fn difference_application_checks_preconditions() {
    let broken_predecessor =
        PREDECESSOR_FULL_MODEL.replace("Name of my element", "A different name");
    let reader = CimXmlReader::new();
    let predecessor = reader.parse_cim_model_str(&broken_predecessor).unwrap();
    let difference = reader.parse_cim_model_str(DIFFERENCE_MODEL).unwrap();
    assert!(difference
        .difference_model_to_full_model(&predecessor)
        .is_err());
}

#[test]
fn difference_containers_share_prefixes() {
    let cimxml = r#"<?xml version="1.0" encoding="utf-8"?>
        <rdf:RDF
            xmlns:dm="http://iec.ch/TC57/61970-552/DifferenceModel/1#"
            xmlns:md="http://iec.ch/TC57/61970-552/ModelDescription/1#"
            xmlns:cim="http://iec.ch/TC57/CIM100#"
            xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#">
         <dm:DifferenceModel rdf:about="urn:uuid:08984e27-811f-4042-9125-1531ae0de0f6">
            <dm:preconditions rdf:parseType="Statements"></dm:preconditions>
            <dm:forwardDifferences rdf:parseType="Statements"></dm:forwardDifferences>
            <dm:reverseDifferences rdf:parseType="Statements"></dm:reverseDifferences>
         </dm:DifferenceModel>
        </rdf:RDF>"#;

    let dataset = CimXmlReader::new().parse_cim_model_str(cimxml).unwrap();
    assert!(dataset.is_difference_model());

    for name in [
        dm::DIFFERENCE_MODEL,
        dm::FORWARD_DIFFERENCES,
        dm::REVERSE_DIFFERENCES,
        dm::PRECONDITIONS,
    ] {
        let graph = dataset.graph(name).unwrap_or_else(|| panic!("missing {name}"));
        let prefixes = graph.prefixes();
        assert_eq!(prefixes.len(), 4, "{name}");
        for prefix in ["rdf", "cim", "md", "dm"] {
            assert!(prefixes.contains_key(prefix), "{name} misses {prefix}");
        }
    }
}

#[test]
fn context_routing_is_exclusive() {
    let reader = CimXmlReader::new();
    let difference = reader.parse_cim_model_str(DIFFERENCE_MODEL).unwrap();

    let fwd = difference.forward_differences().unwrap();
    let rev = difference.reverse_differences().unwrap();
    let pre = difference.preconditions().unwrap();

    let added = Triple::new(
        iri("urn:uuid:135c601e-bad4-4872-ba8f-b15baf91bd2f"),
        cim("MyElement.MyProperty"),
        Term::string("B"),
    );
    assert!(fwd.contains(&added));
    assert!(!rev.contains(&added));
    assert!(!pre.contains(&added));

    // The default graph holds no difference content.
    let body = difference.graph(DEFAULT_GRAPH_IRI).unwrap();
    assert!(body.is_empty());
}

const FLOAT_PROFILE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
         xmlns:rdfs="http://www.w3.org/2000/01/rdf-schema#"
         xmlns:cim="http://iec.ch/TC57/CIM100#"
         xmlns:cims="http://iec.ch/TC57/1999/rdf-schema-extensions-19990926#"
         xmlns:owl="http://www.w3.org/2002/07/owl#"
         xmlns:dcat="http://www.w3.org/ns/dcat#">
  <owl:Ontology rdf:about="http://example.org/CIM/MyProfile">
    <dcat:keyword>EQ</dcat:keyword>
    <owl:versionIRI rdf:resource="http://example.org/CIM/MyProfile/1.1"/>
    <owl:versionInfo>1.1.0</owl:versionInfo>
  </owl:Ontology>
  <rdf:Description rdf:about="http://iec.ch/TC57/CIM100#ClassA.floatProperty">
    <rdfs:domain rdf:resource="http://iec.ch/TC57/CIM100#ClassA"/>
    <cims:dataType rdf:resource="http://iec.ch/TC57/CIM100#Float"/>
  </rdf:Description>
  <rdf:Description rdf:about="http://iec.ch/TC57/CIM100#Float">
    <cims:stereotype>Primitive</cims:stereotype>
    <rdfs:label>Float</rdfs:label>
  </rdf:Description>
</rdf:RDF>"#;

#[test]
fn parse_and_register_profile() {
    let reader = CimXmlReader::new();
    let profile = reader
        .parse_and_register_cim_profile_str(FLOAT_PROFILE)
        .unwrap();
    assert_eq!(
        profile.cim_version(),
        cimxml_vocab::cim::CimVersion::Cim17
    );
    assert!(!profile.is_header_profile());
    assert_eq!(profile.dcat_keyword().as_deref(), Some("EQ"));
    assert_eq!(profile.owl_version_info().as_deref(), Some("1.1.0"));
    assert!(profile
        .owl_version_iris()
        .contains("http://example.org/CIM/MyProfile/1.1"));

    // Duplicate registration is rejected.
    assert!(reader
        .parse_and_register_cim_profile_str(FLOAT_PROFILE)
        .is_err());
}

#[test]
fn profile_aware_literal_typing() {
    let reader = CimXmlReader::new();
    reader
        .parse_and_register_cim_profile_str(FLOAT_PROFILE)
        .unwrap();

    let model = r#"<?xml version="1.0" encoding="utf-8"?>
        <rdf:RDF xmlns:cim="http://iec.ch/TC57/CIM100#"
                 xmlns:md="http://iec.ch/TC57/61970-552/ModelDescription/1#"
                 xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#">
         <md:FullModel rdf:about="urn:uuid:08984e27-811f-4042-9125-1531ae0de0f6">
           <md:Model.profile>http://example.org/CIM/MyProfile/1.1</md:Model.profile>
         </md:FullModel>
         <cim:ClassA rdf:ID="_f67fc354-9e39-4191-a456-67537399bc48">
           <cim:ClassA.floatProperty>47.11</cim:ClassA.floatProperty>
         </cim:ClassA>
        </rdf:RDF>"#;

    let dataset = reader.parse_cim_model_str(model).unwrap();
    let body = dataset.body().unwrap();
    let expected = Term::typed("47.11", Datatype::from_iri(xsd::FLOAT));
    assert!(body.contains(&Triple::new(
        iri("urn:uuid:f67fc354-9e39-4191-a456-67537399bc48"),
        cim("ClassA.floatProperty"),
        expected,
    )));
}

#[test]
fn explicit_datatype_wins_over_profile() {
    let reader = CimXmlReader::new();
    reader
        .parse_and_register_cim_profile_str(FLOAT_PROFILE)
        .unwrap();

    let model = r#"<?xml version="1.0" encoding="utf-8"?>
        <rdf:RDF xmlns:cim="http://iec.ch/TC57/CIM100#"
                 xmlns:md="http://iec.ch/TC57/61970-552/ModelDescription/1#"
                 xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#">
         <md:FullModel rdf:about="urn:uuid:08984e27-811f-4042-9125-1531ae0de0f6">
           <md:Model.profile>http://example.org/CIM/MyProfile/1.1</md:Model.profile>
         </md:FullModel>
         <cim:ClassA rdf:ID="_f67fc354-9e39-4191-a456-67537399bc48">
           <cim:ClassA.floatProperty rdf:datatype="http://www.w3.org/2001/XMLSchema#decimal">47.11</cim:ClassA.floatProperty>
         </cim:ClassA>
        </rdf:RDF>"#;

    let dataset = reader.parse_cim_model_str(model).unwrap();
    let body = dataset.body().unwrap();
    let expected = Term::typed("47.11", Datatype::from_iri(xsd::DECIMAL));
    assert!(body.contains(&Triple::new(
        iri("urn:uuid:f67fc354-9e39-4191-a456-67537399bc48"),
        cim("ClassA.floatProperty"),
        expected,
    )));
}

const HEADER_PROFILE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
         xmlns:rdfs="http://www.w3.org/2000/01/rdf-schema#"
         xmlns:cim="http://iec.ch/TC57/CIM100#"
         xmlns:md="http://iec.ch/TC57/61970-552/ModelDescription/1#"
         xmlns:cims="http://iec.ch/TC57/1999/rdf-schema-extensions-19990926#">
  <cims:ClassCategory rdf:about="http://example.org/header#Package_FileHeaderProfile"/>
  <rdf:Description rdf:about="http://iec.ch/TC57/61970-552/ModelDescription/1#Model.profile">
    <rdfs:domain rdf:resource="http://iec.ch/TC57/61970-552/ModelDescription/1#Model"/>
    <cims:dataType rdf:resource="http://example.org/header#URI"/>
  </rdf:Description>
  <rdf:Description rdf:about="http://example.org/header#URI">
    <cims:stereotype>Primitive</cims:stereotype>
    <rdfs:label>URI</rdfs:label>
  </rdf:Description>
</rdf:RDF>"#;

#[test]
fn header_profile_types_model_profile_references_as_iris() {
    let reader = CimXmlReader::new();
    let header_profile = reader
        .parse_and_register_cim_profile_str(HEADER_PROFILE)
        .unwrap();
    assert!(header_profile.is_header_profile());
    assert_eq!(header_profile.dcat_keyword().as_deref(), Some("DH"));

    let model = r#"<?xml version="1.0" encoding="utf-8"?>
        <rdf:RDF xmlns:cim="http://iec.ch/TC57/CIM100#"
                 xmlns:md="http://iec.ch/TC57/61970-552/ModelDescription/1#"
                 xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#">
         <md:FullModel rdf:about="urn:uuid:08984e27-811f-4042-9125-1531ae0de0f6">
           <md:Model.profile>http://example.org/CIM/MyProfile/1.1</md:Model.profile>
         </md:FullModel>
        </rdf:RDF>"#;

    let dataset = reader.parse_cim_model_str(model).unwrap();
    let header = dataset.model_header().unwrap();
    let profiles = header.profiles().unwrap();
    assert_eq!(profiles.len(), 1);
    // URI-typed header properties become IRI terms, not literals.
    assert!(profiles.contains(&iri("http://example.org/CIM/MyProfile/1.1")));
}

#[test]
fn iec61970_552_processing_instruction_is_stored_verbatim() {
    let cimxml = r#"<?xml version="1.0" encoding="utf-8"?>
        <?iec61970-552 version="2.0"?>
        <rdf:RDF xmlns:cim="http://iec.ch/TC57/CIM100#"
                 xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#">
        </rdf:RDF>"#;

    let mut sink = DatasetSink::new();
    let mut handler = CollectingErrorHandler::default();
    run_parse(cimxml.as_bytes(), None, None, &mut sink, &mut handler).unwrap();
    assert_eq!(sink.version_of_iec61970_552(), Some(r#"version="2.0""#));
    assert_eq!(sink.version_of_cimxml(), cimxml_vocab::cim::CimVersion::Cim17);
}

#[test]
fn unknown_property_warns_once_per_property() {
    let reader = CimXmlReader::new();
    reader
        .parse_and_register_cim_profile_str(FLOAT_PROFILE)
        .unwrap();

    let model = r#"<?xml version="1.0" encoding="utf-8"?>
        <rdf:RDF xmlns:cim="http://iec.ch/TC57/CIM100#"
                 xmlns:md="http://iec.ch/TC57/61970-552/ModelDescription/1#"
                 xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#">
         <md:FullModel rdf:about="urn:uuid:08984e27-811f-4042-9125-1531ae0de0f6">
           <md:Model.profile>http://example.org/CIM/MyProfile/1.1</md:Model.profile>
         </md:FullModel>
         <cim:ClassA rdf:ID="_f67fc354-9e39-4191-a456-67537399bc48">
           <cim:ClassA.mystery>1</cim:ClassA.mystery>
           <cim:ClassA.mystery>2</cim:ClassA.mystery>
         </cim:ClassA>
        </rdf:RDF>"#;

    let mut sink = DatasetSink::new();
    let mut handler = CollectingErrorHandler::default();
    run_parse(
        model.as_bytes(),
        Some(reader.registry().as_ref()),
        None,
        &mut sink,
        &mut handler,
    )
    .unwrap();

    let not_found: Vec<_> = handler
        .warnings
        .iter()
        .filter(|(m, _)| m.contains("could not be found in current profiles"))
        .collect();
    assert_eq!(not_found.len(), 1);
}
