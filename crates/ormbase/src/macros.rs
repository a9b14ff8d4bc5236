//! Declaration shorthand.

/// Implement [`Model`](crate::Model) for a type from a column list.
///
/// Each entry is `"property" => options`, or `"property" @ "column" => options`
/// when the storage column name differs. An optional `as "table"` overrides
/// the table name, which otherwise is the type's own name. Repeating a
/// property merges its options, exactly like repeated
/// [`TableBuilder::column`](crate::TableBuilder::column) calls.
///
/// ```
/// use ormbase::prelude::*;
///
/// struct Tag;
///
/// ormbase::model! {
///     Tag {
///         "id" => ColumnOptions::new().primary_key(),
///         "label" => ColumnOptions::new(),
///     }
/// }
///
/// assert_eq!(ormbase::table_name_of::<Tag>(), "Tag");
/// ```
#[macro_export]
macro_rules! model {
    (
        $ty:ty $(as $table:literal)? {
            $( $prop:literal $(@ $column:literal)? => $options:expr ),* $(,)?
        }
    ) => {
        impl $crate::Model for $ty {
            fn declare(table: $crate::TableBuilder) -> $crate::TableBuilder {
                $( let table = table.table($table); )?
                $(
                    let table = table.declare({
                        let def = $crate::ColumnDef::new($prop).options($options);
                        $( let def = def.column($column); )?
                        def
                    });
                )*
                table
            }
        }
    };
}
