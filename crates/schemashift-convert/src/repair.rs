use regex::Regex;

use crate::errors::Result;

const STRAY_BRACE_PATTERN: &str = r#"\}\n  @@map\("([^"]+)"\)\n\}"#;

/// Repaired document text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repair {
    pub text: String,
    /// Number of model blocks that were fixed.
    pub repaired: usize,
}

/// Remove the stray closing brace placed before `@@map` by legacy generators.
///
/// `}\n  @@map("t")\n}` becomes `  @@map("t")\n}`. Applying the repair to its
/// own output changes nothing.
pub fn repair_generated_schema(text: &str) -> Result<Repair> {
    let pattern = Regex::new(STRAY_BRACE_PATTERN)?;
    let mut current = text.to_string();
    let mut repaired = 0;

    loop {
        let count = pattern.find_iter(&current).count();
        if count == 0 {
            break;
        }
        repaired += count;
        current = pattern
            .replace_all(&current, "  @@map(\"$1\")\n}")
            .into_owned();
    }

    if repaired > 0 {
        tracing::debug!(event = "schema_repaired", blocks = repaired);
    }

    Ok(Repair {
        text: current,
        repaired,
    })
}
