// Flattens a document body into plain text.
//
// Text runs are copied verbatim in document order. Paragraph ends are already
// encoded as a trailing "\n" on the last run of each paragraph, so nothing is
// inserted between paragraphs. Tables and tables of contents are walked in
// row/cell order since their cells are themselves lists of structural elements.

use super::docs_models::{Document, StructuralElement};

pub fn document_text(document: &Document) -> String {
    let mut output = String::new();
    if let Some(body) = &document.body {
        extract_elements(&body.content, &mut output);
    }
    output
}

fn extract_elements(elements: &[StructuralElement], output: &mut String) {
    for element in elements {
        if let Some(paragraph) = &element.paragraph {
            for para_element in &paragraph.elements {
                if let Some(content) = para_element
                    .text_run
                    .as_ref()
                    .and_then(|run| run.content.as_deref())
                {
                    output.push_str(content);
                }
            }
        }

        if let Some(table) = &element.table {
            for row in &table.table_rows {
                for cell in &row.table_cells {
                    extract_elements(&cell.content, output);
                }
            }
        }

        if let Some(toc) = &element.table_of_contents {
            extract_elements(&toc.content, output);
        }
    }
}
