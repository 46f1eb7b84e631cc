//! Flat skill naming
//!
//! Every skill is linked into the destination under a single flat name made
//! from the source's base name and the skill's path inside that source.
//!
//! ```text
//! ("github.com_hayeah_skills", "")    -> github.com_hayeah_skills
//! ("github.com_hayeah_skills", "a/b") -> github.com_hayeah_skills_a_b
//! ```
//!
//! The scheme is not collision free: `a_b` and `a/b` map to the same name.

/// Replace every `/` in a source identifier with `_`.
pub fn flatten(identifier: &str) -> String {
    identifier.replace('/', "_")
}

/// Flat skill name for a skill at `rel_path` inside a source named `base_name`.
///
/// `rel_path` is empty for a skill at the source root.
pub fn skill_name(base_name: &str, rel_path: &str) -> String {
    if rel_path.is_empty() {
        return base_name.to_string();
    }
    let sub = rel_path.replace(std::path::is_separator, "_");
    format!("{base_name}_{sub}")
}

/// Whether `name` is a single path component safe to join onto a directory:
/// non-empty, not `.` or `..`, and free of path separators.
pub fn is_flat_name(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains(std::path::is_separator)
}
