use crate::core::normalizer::records_to_json;
use crate::domain::model::NormalizedTable;
use crate::utils::error::Result;

pub fn render_declaration(keyword: &str, identifier: &str, json: &str) -> String {
    if keyword.is_empty() {
        format!("{} = {};", identifier, json)
    } else {
        format!("{} {} = {};", keyword, identifier, json)
    }
}

/// Renders every table as a declaration, separated by blank lines, with a
/// trailing newline.
pub fn render_document(keyword: &str, tables: &[NormalizedTable]) -> Result<String> {
    let declarations = tables
        .iter()
        .map(|table| {
            let json = records_to_json(&table.records)?;
            Ok(render_declaration(keyword, &table.identifier, &json))
        })
        .collect::<Result<Vec<_>>>()?;

    let mut document = declarations.join("\n\n");
    document.push('\n');
    Ok(document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::Record;
    use serde_json::json;

    fn table(identifier: &str, records: Vec<Record>) -> NormalizedTable {
        NormalizedTable {
            identifier: identifier.to_string(),
            fields: records
                .first()
                .map(|r| r.keys().cloned().collect())
                .unwrap_or_default(),
            records,
            dropped_rows: 0,
        }
    }

    fn record(value: serde_json::Value) -> Record {
        match value {
            serde_json::Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_render_declaration() {
        assert_eq!(render_declaration("const", "data", "[]"), "const data = [];");
        assert_eq!(render_declaration("", "data", "[]"), "data = [];");
    }

    #[test]
    fn test_render_document_layout() {
        let tables = vec![
            table("orderBookData", vec![record(json!({"poNumber": "A1"}))]),
            table("salesBookData", vec![]),
        ];

        let document = render_document("const", &tables).unwrap();
        assert_eq!(
            document,
            "const orderBookData = [\n    {\n        \"poNumber\": \"A1\"\n    }\n];\n\nconst salesBookData = [];\n"
        );
    }
}
