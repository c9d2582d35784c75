//! Read-only textual listings of scopes and entries

use super::entry::Entry;
use super::scope::{FinalizedScope, Scope};
use super::table::SymbolTable;
use std::fmt::{self, Write};

fn field<T: fmt::Display>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

/// Every field of one entry, unset ones shown as `-`
pub fn format_entry(entry: &Entry) -> String {
    format!(
        "Symbol: {}\n    Type: {} ({}) | Start Index: {} | End Index: {} | Base Type: {} | \
         Offset: {} | Label: {} | Static Nesting Level: {} | Frame Size: {}",
        entry.name(),
        entry.category(),
        entry.category().code(),
        field(entry.bounds().map(|b| b.start())),
        field(entry.bounds().map(|b| b.end())),
        field(entry.base_type()),
        field(entry.offset()),
        field(entry.label()),
        field(entry.static_nest_level()),
        field(entry.frame_size()),
    )
}

fn write_header(
    out: &mut String,
    level: usize,
    owner: Option<&str>,
    size: usize,
    frame_size: Option<i64>,
) {
    let _ = write!(out, "Scope level {} (owner: {}", level, owner.unwrap_or("-"));
    let _ = write!(out, ", entries: {}", size);
    if let Some(frame) = frame_size {
        let _ = write!(out, ", frame size: {}", frame);
    }
    out.push_str(")\n");
}

fn write_entries<'a>(out: &mut String, entries: impl Iterator<Item = &'a Entry>) {
    for entry in entries {
        out.push_str("  ");
        out.push_str(&format_entry(entry));
        out.push('\n');
    }
}

pub fn dump_scope(scope: &Scope) -> String {
    let mut out = String::new();
    write_header(&mut out, scope.level(), scope.owner(), scope.size(), None);
    write_entries(&mut out, scope.entries());
    out
}

pub fn dump_table(table: &SymbolTable) -> String {
    let mut out = format!(
        "Symbol table: {} scope(s), {} entr{}\n",
        table.scopes().len(),
        table.entry_count(),
        if table.entry_count() == 1 { "y" } else { "ies" }
    );
    for scope in table.scopes() {
        out.push_str(&dump_scope(scope));
    }
    out
}

impl fmt::Display for FinalizedScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        write_header(
            &mut out,
            self.level(),
            self.owner(),
            self.size(),
            Some(self.frame_size()),
        );
        write_entries(&mut out, self.entries().iter());
        f.write_str(&out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::entry::{ArrayBounds, Category};
    use crate::symbols::layout::LayoutPolicy;

    #[test]
    fn test_entry_listing_has_every_field() {
        let entry = Entry::array("arr", Category::Int, Some(ArrayBounds::new(0, 9).unwrap()));
        let text = format_entry(&entry);

        for label in [
            "Symbol: arr",
            "Type: array (4)",
            "Start Index: 0",
            "End Index: 9",
            "Base Type: int",
            "Offset: -",
            "Label: -",
            "Static Nesting Level: -",
            "Frame Size: -",
        ] {
            assert!(text.contains(label), "missing {:?} in {}", label, text);
        }
    }

    #[test]
    fn test_table_dump_lists_live_scopes() {
        let mut table = SymbolTable::with_policy(LayoutPolicy::default());
        table.enter_scope().unwrap();
        table.declare(Entry::program("main")).unwrap();
        table.enter_scope().unwrap();
        table.declare(Entry::variable("x", Category::Int)).unwrap();

        let text = table.dump();
        assert!(text.starts_with("Symbol table: 2 scope(s), 2 entries"));
        assert!(text.contains("Scope level 0 (owner: -, entries: 1)"));
        assert!(text.contains("Scope level 1"));
        assert!(text.contains("Symbol: main"));
        assert!(text.contains("Label: L"));
        assert!(text.contains("Static Nesting Level: 1"));
    }

    #[test]
    fn test_finalized_scope_display() {
        let mut table = SymbolTable::with_policy(LayoutPolicy {
            base_offset: 0,
            int_unit_size: 1,
            boolean_unit_size: 1,
            char_unit_size: 1,
        });
        table.enter_scope().unwrap();
        table.declare(Entry::program("main")).unwrap();
        table.declare(Entry::variable("x", Category::Int)).unwrap();

        let closed = table.finish().unwrap();
        let text = closed.to_string();
        assert!(text.contains("owner: main"));
        assert!(text.contains("frame size: 1"));
        assert!(text.contains("Offset: 0"));
        assert!(text.contains("Frame Size: 1"));
    }
}
