//! Display formatting for national registration numbers.
//!
//! Inputs are expected to be validated digit strings of the right length.
//! Mis-sized input is sliced as far as it goes; formatting never panics.

use crate::model::{AccidentRecord, TaxIdType};

/// Join consecutive slices of `digits` with the given separators.
///
/// `widths` lists the size of every group but the last, which takes the rest.
fn group(digits: &str, widths: &[usize], separators: &[char]) -> String {
    debug_assert_eq!(widths.len(), separators.len());
    let mut out = String::with_capacity(digits.len() + separators.len());
    let mut rest = digits;
    for (&width, &sep) in widths.iter().zip(separators) {
        let cut = floor_char_boundary(rest, width);
        out.push_str(&rest[..cut]);
        out.push(sep);
        rest = &rest[cut..];
    }
    out.push_str(rest);
    out
}

fn floor_char_boundary(s: &str, index: usize) -> usize {
    if index >= s.len() {
        return s.len();
    }
    (0..=index).rev().find(|&i| s.is_char_boundary(i)).unwrap_or(0)
}

/// `NN.NNN.NNN/NNNN-NN`
pub fn format_cnpj(digits: &str) -> String {
    group(digits, &[2, 3, 3, 4], &['.', '.', '/', '-'])
}

/// `NN.NNN.NNN`, the 8-digit company root.
pub fn format_cnpj_root(digits: &str) -> String {
    let end = floor_char_boundary(digits, 8);
    group(&digits[..end], &[2, 3], &['.', '.'])
}

/// `NNN.NNN.NNN-NN`
pub fn format_cpf(digits: &str) -> String {
    group(digits, &[3, 3, 3], &['.', '.', '-'])
}

/// `NNN.NNN.NNN/NNN-NN`
pub fn format_caepf(digits: &str) -> String {
    group(digits, &[3, 3, 3, 3], &['.', '.', '/', '-'])
}

/// `NN.NNN.NNNNN/NN`
pub fn format_cno(digits: &str) -> String {
    group(digits, &[2, 3, 5], &['.', '.', '/'])
}

impl TaxIdType {
    /// Format a tax identifier in its scheme's canonical presentation.
    pub fn format(self, digits: &str) -> String {
        match self {
            TaxIdType::Cnpj if digits.len() == 8 => format_cnpj_root(digits),
            TaxIdType::Cnpj => format_cnpj(digits),
            TaxIdType::Cpf => format_cpf(digits),
            TaxIdType::Caepf => format_caepf(digits),
            TaxIdType::Cno => format_cno(digits),
        }
    }
}

/// Economic activity subclass, `NNNN-N/NN`.
pub fn format_activity_code(digits: &str) -> String {
    group(digits, &[4, 1], &['-', '/'])
}

/// Occupation code, `NNNN-NN`.
pub fn format_occupation_code(digits: &str) -> String {
    group(digits, &[4], &['-'])
}

/// Fill the formatted identifier fields of a record.
pub fn annotate(record: &mut AccidentRecord) {
    record.formatted_tax_id = match (record.tax_id_type, record.tax_id.as_deref()) {
        (Some(kind), Some(digits)) => Some(kind.format(digits)),
        _ => None,
    };
    record.formatted_activity_code = record.activity_code.as_deref().map(format_activity_code);
    record.formatted_occupation_code = record.occupation_code.as_deref().map(format_occupation_code);
}
