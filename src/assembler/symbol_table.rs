//! Label definitions collected during the first assembler pass

use std::collections::HashMap;

use crate::assembler::Symbol;

/// Labels in definition order, with a name index.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    symbols: Vec<Symbol>,
    index: HashMap<String, usize>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a symbol to the table
    ///
    /// Returns the existing definition if the name is already taken.
    pub fn add_symbol(&mut self, name: String, address: u16, line: usize) -> Result<(), Symbol> {
        if let Some(existing) = self.lookup_symbol(&name) {
            return Err(existing.clone());
        }

        self.index.insert(name.clone(), self.symbols.len());
        self.symbols.push(Symbol {
            name,
            address,
            line,
        });
        Ok(())
    }

    pub fn lookup_symbol(&self, name: &str) -> Option<&Symbol> {
        self.index.get(name).map(|&i| &self.symbols[i])
    }

    pub fn into_symbols(self) -> Vec<Symbol> {
        self.symbols
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_table_add_lookup() {
        let mut table = SymbolTable::new();

        assert!(table.add_symbol("START".to_string(), 0xFD00, 1).is_ok());
        assert!(table.add_symbol("LOOP".to_string(), 0xFD10, 5).is_ok());

        let start = table.lookup_symbol("START").unwrap();
        assert_eq!(start.address, 0xFD00);
        assert_eq!(table.lookup_symbol("LOOP").unwrap().line, 5);
        assert!(table.lookup_symbol("UNDEFINED").is_none());
    }

    #[test]
    fn test_symbol_table_duplicate() {
        let mut table = SymbolTable::new();

        assert!(table.add_symbol("START".to_string(), 0xFD00, 1).is_ok());
        let existing = table.add_symbol("START".to_string(), 0x9000, 10).unwrap_err();
        assert_eq!(existing.line, 1);

        // Original symbol should still be there
        assert_eq!(table.lookup_symbol("START").unwrap().address, 0xFD00);
        assert_eq!(table.into_symbols().len(), 1);
    }
}
