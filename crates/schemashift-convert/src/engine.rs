use sha2::{Digest, Sha256};
use tracing::{info, warn};

use schemashift_core::{EnumRegistry, TargetType, validate_models};
use schemashift_extract::extract_tables;

use crate::assembler::ModelAssembler;
use crate::emitter::SchemaEmitter;
use crate::errors::Result;
use crate::mapper::TypeMapper;
use crate::options::ConvertOptions;
use crate::repair::repair_generated_schema;
use crate::report::{ConversionReport, ModelSummary, UnmappedField, UnparsedIndex};

/// Result of a successful conversion run.
#[derive(Debug, Clone)]
pub struct Conversion {
    /// Complete target document.
    pub document: String,
    pub report: ConversionReport,
}

/// Convert a source schema document into a target schema document.
///
/// The run either produces a complete document or fails; nothing is
/// written here.
pub fn convert(source: &str, opts: &ConvertOptions) -> Result<Conversion> {
    let extraction = extract_tables(source, &opts.extract_options());
    let dialect = extraction.dialect;

    let mapper = TypeMapper::new(dialect, opts.identity);
    let assembler = ModelAssembler::new(&opts.exclude, opts.audit_fields)?;
    let mut enums = EnumRegistry::new(opts.enum_conflict);

    let mut models = Vec::new();
    let mut excluded_tables = Vec::new();
    let mut unmapped_fields = Vec::new();
    let mut unparsed_indexes = Vec::new();

    for table in &extraction.tables {
        if assembler.excludes(table) {
            info!(table = %table.ident, "table excluded");
            excluded_tables.push(table.ident.clone());
            continue;
        }

        let mut fields = Vec::with_capacity(table.fields.len());
        for field in &table.fields {
            fields.push(mapper.map_field(field, &mut enums)?);
        }

        let Some(assembled) = assembler.assemble(table, fields) else {
            continue;
        };
        let model = assembled.model;

        for field in &model.fields {
            let TargetType::Unmapped { raw } = &field.field_type else {
                continue;
            };
            warn!(model = %model.name, field = %field.name, expression = %raw, "field type unmapped");
            unmapped_fields.push(UnmappedField {
                model: model.name.clone(),
                field: field.name.clone(),
                expression: raw.clone(),
            });
        }
        for descriptor in assembled.unparsed_indexes {
            warn!(model = %model.name, %descriptor, "index descriptor not understood");
            unparsed_indexes.push(UnparsedIndex {
                model: model.name.clone(),
                descriptor,
            });
        }

        models.push(model);
    }

    for conflict in enums.conflicts() {
        warn!(
            enum_name = %conflict.name,
            kept = %conflict.existing.join(", "),
            ignored = %conflict.incoming.join(", "),
            "enum redefined with different values"
        );
    }

    validate_models(&models)?;

    let emitted =
        SchemaEmitter::new(&opts.header, opts.column_width).emit(&enums, &models, excluded_tables.len());
    let repair = repair_generated_schema(&emitted)?;
    let document_fingerprint = hex::encode(Sha256::digest(repair.text.as_bytes()));

    let report = ConversionReport {
        dialect: dialect.name().to_string(),
        models: models
            .iter()
            .map(|model| ModelSummary {
                model: model.name.clone(),
                table: model.table_name.clone(),
                fields: model.fields.len(),
            })
            .collect(),
        enums: enums.iter().map(|declaration| declaration.name.clone()).collect(),
        excluded_tables,
        skipped_lines: extraction.skipped,
        unmapped_fields,
        unparsed_indexes,
        enum_conflicts: enums.conflicts().to_vec(),
        repaired_blocks: repair.repaired,
        document_fingerprint,
    };

    info!(
        dialect = %report.dialect,
        models = report.models.len(),
        enums = report.enums.len(),
        unmapped = report.unmapped_fields.len(),
        skipped = report.skipped_lines.len(),
        "conversion finished"
    );

    Ok(Conversion {
        document: repair.text,
        report,
    })
}
