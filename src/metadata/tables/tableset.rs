use crate::metadata::{
    tables::{
        CodedIndex, MemberRefRaw, MetadataTables, TableId, TypeDefRaw, TypeRefRaw, TypeSpecRaw,
    },
    token::Token,
};

/// In-memory metadata tables.
///
/// Rows are appended with the `add_*` methods, which return the token of the new row. Row
/// numbers start at 1 in every table.
///
/// # Examples
///
/// ```rust
/// use ilmock::metadata::tables::{CodedIndex, MetadataTables, TableId, TableSet};
///
/// let mut tables = TableSet::new();
/// let console = tables.add_type_ref("System", "Console");
/// // void WriteLine(string)
/// let write_line = tables.add_member_ref(
///     CodedIndex::new(TableId::TypeRef, console.row()),
///     "WriteLine",
///     &[0x00, 0x01, 0x01, 0x0E],
/// );
///
/// assert_eq!(write_line.value(), 0x0A00_0001);
/// assert_eq!(tables.member_ref(1).unwrap().name, "WriteLine");
/// ```
#[derive(Debug, Default, Clone)]
pub struct TableSet {
    type_refs: Vec<TypeRefRaw>,
    type_defs: Vec<TypeDefRaw>,
    type_specs: Vec<TypeSpecRaw>,
    member_refs: Vec<MemberRefRaw>,
}

impl TableSet {
    /// Create empty tables
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn next_rid(len: usize) -> u32 {
        #[allow(clippy::cast_possible_truncation)]
        let rid = len as u32 + 1;
        rid
    }

    /// Append a `TypeRef` row
    pub fn add_type_ref(&mut self, namespace: &str, name: &str) -> Token {
        let rid = Self::next_rid(self.type_refs.len());
        let token = Token::from_parts(TableId::TypeRef, rid);
        self.type_refs.push(TypeRefRaw {
            rid,
            token,
            namespace: namespace.to_string(),
            name: name.to_string(),
        });
        token
    }

    /// Append a `TypeDef` row
    pub fn add_type_def(&mut self, flags: u32, namespace: &str, name: &str) -> Token {
        let rid = Self::next_rid(self.type_defs.len());
        let token = Token::from_parts(TableId::TypeDef, rid);
        self.type_defs.push(TypeDefRaw {
            rid,
            token,
            flags,
            namespace: namespace.to_string(),
            name: name.to_string(),
        });
        token
    }

    /// Append a `TypeSpec` row
    pub fn add_type_spec(&mut self, signature: &[u8]) -> Token {
        let rid = Self::next_rid(self.type_specs.len());
        let token = Token::from_parts(TableId::TypeSpec, rid);
        self.type_specs.push(TypeSpecRaw {
            rid,
            token,
            signature: signature.to_vec(),
        });
        token
    }

    /// Append a `MemberRef` row
    pub fn add_member_ref(&mut self, class: CodedIndex, name: &str, signature: &[u8]) -> Token {
        let rid = Self::next_rid(self.member_refs.len());
        let token = Token::from_parts(TableId::MemberRef, rid);
        self.member_refs.push(MemberRefRaw {
            rid,
            token,
            class,
            name: name.to_string(),
            signature: signature.to_vec(),
        });
        token
    }
}

fn row_at<T>(rows: &[T], rid: u32) -> Option<&T> {
    rows.get((rid as usize).checked_sub(1)?)
}

impl MetadataTables for TableSet {
    fn type_ref(&self, rid: u32) -> Option<&TypeRefRaw> {
        row_at(&self.type_refs, rid)
    }

    fn type_def(&self, rid: u32) -> Option<&TypeDefRaw> {
        row_at(&self.type_defs, rid)
    }

    fn type_spec(&self, rid: u32) -> Option<&TypeSpecRaw> {
        row_at(&self.type_specs, rid)
    }

    fn member_ref(&self, rid: u32) -> Option<&MemberRefRaw> {
        row_at(&self.member_refs, rid)
    }

    fn row_count(&self, table: TableId) -> u32 {
        let count = match table {
            TableId::TypeRef => self.type_refs.len(),
            TableId::TypeDef => self.type_defs.len(),
            TableId::TypeSpec => self.type_specs.len(),
            TableId::MemberRef => self.member_refs.len(),
            _ => 0,
        };
        #[allow(clippy::cast_possible_truncation)]
        let count = count as u32;
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_are_one_based() {
        let mut tables = TableSet::new();
        let first = tables.add_type_ref("System", "Object");
        let second = tables.add_type_ref("System", "String");

        assert_eq!(first, Token::new(0x0100_0001));
        assert_eq!(second, Token::new(0x0100_0002));
        assert!(tables.type_ref(0).is_none());
        assert_eq!(tables.type_ref(2).unwrap().name, "String");
        assert!(tables.type_ref(3).is_none());
        assert_eq!(tables.row_count(TableId::TypeRef), 2);
        assert_eq!(tables.row_count(TableId::Field), 0);
    }

    #[test]
    fn tables_are_independent() {
        let mut tables = TableSet::new();
        let def = tables.add_type_def(0, "Acme", "Widget");
        let spec = tables.add_type_spec(&[0x1D, 0x08]);
        let member = tables.add_member_ref(CodedIndex::new(TableId::TypeDef, def.row()), "Run", &[0x20, 0x00, 0x01]);

        assert_eq!(def.table_id(), Some(TableId::TypeDef));
        assert_eq!(spec, Token::new(0x1B00_0001));
        assert_eq!(member.row(), 1);

        let row = tables.member_ref(member.row()).unwrap();
        assert_eq!(row.class.token, def);
        assert_eq!(tables.type_spec(1).unwrap().signature, vec![0x1D, 0x08]);
        assert_eq!(tables.type_def(1).unwrap().namespace, "Acme");
    }
}
