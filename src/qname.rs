//! Splitting and validation of XML names.

/// Split a qualified name into `(Prefix, LocalPart)`.
///
/// If the name has no `:`, or starts with `:`, return `None`.
/// The local part may be empty (e.g. `"a:"`).
pub(crate) fn split_qname2(name: &str) -> Option<(&str, &str)> {
    // nasty but valid
    if name.starts_with(':') {
        return None;
    }

    // we are not trying to validate but just to cut
    name.split_once(':')
}

/// Split `name` and return `(prefix, local_name)`.
/// An empty part is reported as `None`.
pub(crate) fn split_prefix_local(name: &str) -> (Option<&str>, Option<&str>) {
    match split_qname2(name) {
        Some((prefix, local)) => (
            Some(prefix).filter(|p| !p.is_empty()),
            Some(local).filter(|l| !l.is_empty()),
        ),
        None => (None, Some(name).filter(|n| !n.is_empty())),
    }
}

fn is_name_start_char(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric()
        || c == '.'
        || c == '-'
        || c == '_'
        || c == '\u{B7}'
        || ('\u{300}'..='\u{36F}').contains(&c)
        || ('\u{203F}'..='\u{2040}').contains(&c)
}

/// Check that a value conforms to the lexical space of NCName.
pub(crate) fn validate_ncname(value: &str) -> Result<(), &'static str> {
    // First quick algorithm for ASCII range
    if let Some(rem) = value.strip_prefix(|c: char| c.is_ascii_alphabetic() || c == '_') {
        let rem =
            rem.trim_start_matches(|c: char| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
        if rem.is_empty() {
            return Ok(());
        }
    }

    // Second check for chars outside the ASCII range
    let Some(rem) = value.strip_prefix(is_name_start_char) else {
        return Err("Invalid NCName");
    };
    if rem.trim_start_matches(is_name_char).is_empty() {
        Ok(())
    } else {
        Err("Invalid NCName")
    }
}

/// Check that a value conforms to the lexical space of QName.
pub(crate) fn validate_qname(value: &str) -> Result<(), &'static str> {
    match split_qname2(value) {
        Some((prefix, local)) => {
            validate_ncname(prefix).map_err(|_| "Invalid QName")?;
            validate_ncname(local).map_err(|_| "Invalid QName")
        }
        None => validate_ncname(value).map_err(|_| "Invalid QName"),
    }
}

/// Check that a value conforms to the lexical space of Name.
pub(crate) fn validate_name(value: &str) -> Result<(), &'static str> {
    let Some(rem) = value.strip_prefix(|c: char| is_name_start_char(c) || c == ':') else {
        return Err("Invalid Name");
    };
    if rem
        .trim_start_matches(|c: char| is_name_char(c) || c == ':')
        .is_empty()
    {
        Ok(())
    } else {
        Err("Invalid Name")
    }
}
