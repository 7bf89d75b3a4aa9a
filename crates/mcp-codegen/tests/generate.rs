//! Generation from a fixture document through to files on disk

use std::path::PathBuf;

use mcp_codegen::{ServerAssembler, Variant};
use openapi_parser::{OpenApiParser, ParsedSpec};

fn fixture() -> (ParsedSpec, PathBuf) {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/financial_reports.yaml");
    (OpenApiParser::load_file(&path).unwrap(), path)
}

fn generate(variant: Variant) -> String {
    let (spec, path) = fixture();
    ServerAssembler::new()
        .unwrap()
        .assemble(&spec, variant, &path.display().to_string())
        .unwrap()
}

#[test]
fn one_tool_per_get_operation_with_id() {
    let code = generate(Variant::Stdio);

    let tools: Vec<&str> = code
        .lines()
        .filter_map(|l| l.strip_prefix("pub async fn "))
        .map(|l| l.split('(').next().unwrap())
        .collect();
    assert_eq!(
        tools,
        vec!["companies_list", "companies_retrieve", "filings_list", "filings_markdown_retrieve"]
    );
    assert!(!code.contains("filings_create"));
}

#[test]
fn path_level_parameters_are_merged() {
    let code = generate(Variant::Stdio);
    assert!(code.contains(
        "pub struct CompaniesRetrieveArgs {\n    /// A unique integer value identifying this company.\n    pub id: i64,\n}"
    ));
    assert!(code.contains("/// * `id` - A unique integer value identifying this company."));
}

#[test]
fn referenced_parameters_and_keywords() {
    let code = generate(Variant::Stdio);

    assert!(code.contains("    #[serde(default = \"filings_list_ordering_default\")]\n    pub ordering: Option<String>,"));
    assert!(code.contains("    Some(\"-release_datetime\".to_string())"));

    assert!(code.contains("    #[serde(rename = \"type\", default)]\n    pub type_: Option<String>,"));
    assert!(code.contains("    query.push(\"type\", &args.type_);"));

    assert!(!code.contains("X-Request-Id"));
}

#[test]
fn typed_optional_parameters() {
    let code = generate(Variant::Stdio);
    assert!(code.contains("    pub on_watchlist: Option<bool>,"));
    assert!(code.contains("fn companies_list_page_size_default() -> Option<i64> {\n    Some(25)\n}"));
}

#[test]
fn listing_schema_embedded_for_registration() {
    let code = generate(Variant::Worker);
    assert!(code.contains(
        "r#\"{\"type\":\"object\",\"properties\":{\"filing_id\":{\"type\":\"integer\""
    ));
    assert!(code.contains("        filings_markdown_retrieve,\n    ));"));
}

#[test]
fn writes_both_variants() {
    let (spec, path) = fixture();
    let dir = tempfile::tempdir().unwrap();
    let assembler = ServerAssembler::new().unwrap();

    for variant in Variant::ALL {
        assembler
            .write(&spec, variant, &path.display().to_string(), dir.path())
            .unwrap();
    }

    let stdio = std::fs::read_to_string(dir.path().join("stdio.rs")).unwrap();
    let worker = std::fs::read_to_string(dir.path().join("worker.rs")).unwrap();
    assert!(stdio.contains("McpServer::stdio_from_env(registry)?"));
    assert!(worker.contains("McpServer::http(registry, port)"));
    assert!(worker.contains("drops it when the call returns"));
}
