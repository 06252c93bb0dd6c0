//! Tables. Data and header cells share an [`HtmlTableCellElement`] layer.

use super::{related_all, AnyHtmlElement, BasicHtmlElement};
use crate::error::{BridgeError, Result};
use crate::host::Value;
use crate::node::Node;

/// Where to insert a row or cell. The host treats -1 as "at the end".
fn position(index: Option<usize>) -> Value {
    match index {
        Some(index) => Value::from(index),
        None => Value::from(-1),
    }
}

fn inserted(owner: &dyn Node, method: &str, index: Option<usize>) -> Result<AnyHtmlElement> {
    let node = owner.as_node();
    let value = node.invoke::<Value>(method, &[position(index)])?;
    node.realm()
        .wrap_html_element(&value)?
        .ok_or_else(|| BridgeError::UnexpectedValue {
            property: format!("{method}()"),
            expected: "HTMLElement",
            found: value.kind(),
        })
}

html_element!(HtmlTableElement);

impl HtmlTableElement {
    pub fn rows(&self) -> Result<Vec<HtmlTableRowElement>> {
        related_all(self.as_node(), "rows")
    }

    /// Insert a row at `index`, or append with `None`.
    pub fn insert_row(&self, index: Option<usize>) -> Result<AnyHtmlElement> {
        inserted(self, "insertRow", index)
    }

    /// Delete the row at `index`, or the last row with `None`.
    pub fn delete_row(&self, index: Option<usize>) -> Result<()> {
        self.as_node().invoke("deleteRow", &[position(index)])
    }

    reflect! {
        align / set_align: String = "align";
    }
}

html_element!(HtmlTableCaptionElement);

impl HtmlTableCaptionElement {
    reflect! {
        align / set_align: String = "align";
    }
}

/// The shared cell layer. Also what a bare `HTMLTableCellElement` wraps to.
#[derive(Debug, Clone)]
pub struct HtmlTableCellElement {
    html: BasicHtmlElement,
}

impl HtmlTableCellElement {
    pub(crate) fn from_layer(html: BasicHtmlElement) -> Self {
        Self { html }
    }

    reflect! {
        col_span / set_col_span: f64 = "colSpan";
        row_span / set_row_span: f64 = "rowSpan";
        headers / set_headers: String = "headers";
    }
}

html_layers!(HtmlTableCellElement, html);

#[derive(Debug, Clone)]
pub struct HtmlTableDataCellElement {
    cell: HtmlTableCellElement,
}

impl HtmlTableDataCellElement {
    pub(crate) fn from_layer(html: BasicHtmlElement) -> Self {
        Self {
            cell: HtmlTableCellElement::from_layer(html),
        }
    }

    pub fn cell(&self) -> &HtmlTableCellElement {
        &self.cell
    }
}

html_layers!(HtmlTableDataCellElement, cell.html);

#[derive(Debug, Clone)]
pub struct HtmlTableHeaderCellElement {
    cell: HtmlTableCellElement,
}

impl HtmlTableHeaderCellElement {
    pub(crate) fn from_layer(html: BasicHtmlElement) -> Self {
        Self {
            cell: HtmlTableCellElement::from_layer(html),
        }
    }

    pub fn cell(&self) -> &HtmlTableCellElement {
        &self.cell
    }

    reflect! {
        abbr / set_abbr: String = "abbr";
        scope / set_scope: String = "scope";
    }
}

html_layers!(HtmlTableHeaderCellElement, cell.html);

html_element!(HtmlTableColElement);

impl HtmlTableColElement {
    reflect! {
        span / set_span: f64 = "span";
    }
}

html_element!(HtmlTableRowElement);

impl HtmlTableRowElement {
    /// `td` and `th` children, in order. Either may come back, so the
    /// entries are left as [`AnyHtmlElement`].
    pub fn cells(&self) -> Result<Vec<AnyHtmlElement>> {
        related_all(self.as_node(), "cells")
    }

    pub fn insert_cell(&self, index: Option<usize>) -> Result<AnyHtmlElement> {
        inserted(self, "insertCell", index)
    }

    pub fn delete_cell(&self, index: Option<usize>) -> Result<()> {
        self.as_node().invoke("deleteCell", &[position(index)])
    }
}

html_element!(
    /// `thead`, `tbody` and `tfoot`.
    HtmlTableSectionElement
);

impl HtmlTableSectionElement {
    pub fn rows(&self) -> Result<Vec<HtmlTableRowElement>> {
        related_all(self.as_node(), "rows")
    }

    pub fn insert_row(&self, index: Option<usize>) -> Result<AnyHtmlElement> {
        inserted(self, "insertRow", index)
    }

    pub fn delete_row(&self, index: Option<usize>) -> Result<()> {
        self.as_node().invoke("deleteRow", &[position(index)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BridgeConfig;
    use crate::element::Element;
    use crate::host::memory::MemoryHost;
    use crate::realm::Realm;

    fn table(host: &MemoryHost, realm: &Realm) -> HtmlTableElement {
        let handle = host
            .document()
            .call("getElementById", &[Value::from("t")])
            .unwrap();
        match realm.wrap_html_element(&handle).unwrap() {
            Some(AnyHtmlElement::Table(table)) => table,
            other => panic!("expected a table facade, got {other:?}"),
        }
    }

    #[test]
    fn rows_and_cells_wrap_to_their_layers() {
        let host = MemoryHost::from_html(
            r#"<body><table id="t"><tbody>
                <tr><th scope="col">Name</th><td colspan="2">Ada</td></tr>
                <tr><td>Grace</td></tr>
            </tbody></table></body>"#,
        )
        .unwrap();
        let realm = Realm::new(host.global(), BridgeConfig::default());
        let rows = table(&host, &realm).rows().unwrap();
        assert_eq!(rows.len(), 2);

        let cells = rows[0].cells().unwrap();
        assert_eq!(cells.len(), 2);
        let AnyHtmlElement::TableHeaderCell(header) = &cells[0] else {
            panic!("expected a header cell");
        };
        assert_eq!(header.scope().unwrap(), "col");
        assert_eq!(header.cell().col_span().unwrap(), 1.0);
        let AnyHtmlElement::TableDataCell(data) = &cells[1] else {
            panic!("expected a data cell");
        };
        assert_eq!(data.cell().col_span().unwrap(), 2.0);
        assert_eq!(data.text_content().unwrap(), "Ada");
    }

    #[test]
    fn insertion_and_deletion_use_append_by_default() {
        let host = MemoryHost::from_html(r#"<body><table id="t"><tbody></tbody></table></body>"#)
            .unwrap();
        let realm = Realm::new(host.global(), BridgeConfig::default());
        let table = table(&host, &realm);

        let first = table.insert_row(None).unwrap();
        let AnyHtmlElement::TableRow(row) = first else {
            panic!("expected a row");
        };
        let cell = row.insert_cell(None).unwrap();
        assert!(matches!(cell, AnyHtmlElement::TableDataCell(_)));
        row.insert_cell(Some(0)).unwrap();
        assert_eq!(row.cells().unwrap().len(), 2);
        assert!(cell.is_same_node(&row.cells().unwrap()[1]));

        table.insert_row(Some(0)).unwrap();
        assert_eq!(table.rows().unwrap().len(), 2);
        assert!(table.rows().unwrap()[1].is_same_node(&row));

        table.delete_row(None).unwrap();
        assert_eq!(table.rows().unwrap().len(), 1);
        row.delete_cell(Some(0)).unwrap();
        assert_eq!(row.cells().unwrap().len(), 1);
        assert!(row.delete_cell(Some(7)).is_err());
        assert_eq!(row.tag_name().unwrap(), "TR");
    }
}
