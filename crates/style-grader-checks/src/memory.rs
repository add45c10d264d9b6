//! Best-effort memory-management heuristics.
//!
//! Allocations (`p = new T`, `p = new T[n]`, `p = malloc(..)`) and
//! deallocations (`delete p`, `delete[] p`, `free(p)`) are paired per
//! identifier inside each function body. Function bodies are found by brace
//! depth: the outermost block that is not a namespace, class, struct, union,
//! enum, `extern` block or initializer list.
//!
//! # Detected Patterns
//!
//! - `memory_leak`: an allocation never freed, returned or handed over
//!   before the function ends or the pointer is reassigned
//! - `mismatched_delete`: `delete` on `new[]` memory, `delete[]` on `new`
//!   memory, or mixing `malloc`/`free` with `new`/`delete`
//! - `double_delete`: a second deallocation of the same identifier without an
//!   intervening allocation, while the block of the first one is still open
//!
//! Member pointers (`this->p`, `obj.p`, `m_p`, `p_`) are not tracked since
//! they are usually released in another function.

use regex::Regex;
use std::collections::HashMap;
use style_grader_core::{column_at, Check, Severity, SourceFile, StyleGuide, Violation};

/// Check code for memory.
pub const CODE: &str = "SG007";

/// Check name for memory.
pub const NAME: &str = "memory";

/// Violation type for an allocation that is never freed.
pub const MEMORY_LEAK: &str = "memory_leak";

/// Violation type for a deallocation not matching its allocation.
pub const MISMATCHED_DELETE: &str = "mismatched_delete";

/// Violation type for freeing the same pointer twice.
pub const DOUBLE_DELETE: &str = "double_delete";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Scalar,
    Array,
    Malloc,
}

impl Kind {
    fn allocator(self) -> &'static str {
        match self {
            Self::Scalar => "new",
            Self::Array => "new[]",
            Self::Malloc => "malloc",
        }
    }

    fn deallocator(self) -> &'static str {
        match self {
            Self::Scalar => "delete",
            Self::Array => "delete[]",
            Self::Malloc => "free",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Event {
    Open,
    Close,
    Alloc { ident: String, kind: Kind },
    Free { ident: String, kind: Kind },
    Reassign { ident: String, alias_of: Option<String> },
    Escape { ident: String },
}

#[derive(Debug, Default)]
struct Track {
    allocated: Option<(usize, Kind)>,
    freed: Option<(usize, usize)>,
    escaped: bool,
}

/// Flags leaks, mismatched and double deallocations.
#[derive(Debug, Clone)]
pub struct Memory {
    assignment: Regex,
    scalar_new: Regex,
    array_new: Regex,
    malloc_call: Regex,
    delete: Regex,
    free: Regex,
    escape: Regex,
    container: Regex,
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

impl Memory {
    /// Creates a new check.
    #[must_use]
    pub fn new() -> Self {
        Self {
            assignment: Regex::new(r"(->|\.)?\s*\b([A-Za-z_]\w*)\s*=(?:([^=][^;]*)|$)")
                .expect("Invalid regex"),
            scalar_new: Regex::new(r"^new\b").expect("Invalid regex"),
            array_new: Regex::new(r"^new\b[^;(\[{]*\[").expect("Invalid regex"),
            malloc_call: Regex::new(
                r"^(?:\([^()]*\)\s*)?(?:(?:static|reinterpret)_cast\s*<[^>]*>\s*\(\s*)?(?:std::)?(?:malloc|calloc|realloc)\s*\(",
            )
            .expect("Invalid regex"),
            delete: Regex::new(r"\bdelete\b\s*(\[\s*\])?\s*\(?\s*([A-Za-z_]\w*)")
                .expect("Invalid regex"),
            free: Regex::new(r"\b(?:std::)?free\s*\(\s*([A-Za-z_]\w*)\s*\)").expect("Invalid regex"),
            escape: Regex::new(r"\breturn\b\s*\(?\s*([A-Za-z_]\w*)").expect("Invalid regex"),
            container: Regex::new(
                r"^(?:template\s*<.*>\s*)?(?:namespace|class|struct|union|enum|extern)\b",
            )
            .expect("Invalid regex"),
        }
    }

    /// Events of one masked line, in source order.
    fn events(&self, code: &str) -> Vec<(usize, Event)> {
        let mut events: Vec<(usize, Event)> = code
            .char_indices()
            .filter_map(|(i, c)| match c {
                '{' => Some((i, Event::Open)),
                '}' => Some((i, Event::Close)),
                _ => None,
            })
            .collect();

        for caps in self.assignment.captures_iter(code) {
            let (Some(whole), Some(ident)) = (caps.get(0), caps.get(2)) else {
                continue;
            };
            let ident = ident.as_str();
            let rhs = caps.get(3).map_or("", |m| m.as_str()).trim();
            if caps.get(1).is_some() || is_member_name(ident) || ident == "operator" {
                // Handing a local pointer to a member releases it from tracking.
                if let Some(alias) = bare_identifier(rhs) {
                    events.push((whole.start(), Event::Escape { ident: alias.to_string() }));
                }
                continue;
            }
            let event = if self.scalar_new.is_match(rhs) {
                let kind = if self.array_new.is_match(rhs) {
                    Kind::Array
                } else {
                    Kind::Scalar
                };
                Event::Alloc { ident: ident.to_string(), kind }
            } else if self.malloc_call.is_match(rhs) {
                Event::Alloc { ident: ident.to_string(), kind: Kind::Malloc }
            } else {
                Event::Reassign {
                    ident: ident.to_string(),
                    alias_of: bare_identifier(rhs).map(str::to_string),
                }
            };
            events.push((whole.start(), event));
        }

        for caps in self.delete.captures_iter(code) {
            let (Some(whole), Some(ident)) = (caps.get(0), caps.get(2)) else {
                continue;
            };
            if code[..whole.start()].trim_end().ends_with("operator") {
                continue;
            }
            let kind = if caps.get(1).is_some() {
                Kind::Array
            } else {
                Kind::Scalar
            };
            events.push((whole.start(), Event::Free { ident: ident.as_str().to_string(), kind }));
        }

        for caps in self.free.captures_iter(code) {
            if let (Some(whole), Some(ident)) = (caps.get(0), caps.get(1)) {
                events.push((
                    whole.start(),
                    Event::Free { ident: ident.as_str().to_string(), kind: Kind::Malloc },
                ));
            }
        }

        for caps in self.escape.captures_iter(code) {
            if let (Some(whole), Some(ident)) = (caps.get(0), caps.get(1)) {
                events.push((whole.start(), Event::Escape { ident: ident.as_str().to_string() }));
            }
        }

        events.sort_by_key(|(pos, _)| *pos);
        events
    }

    /// Whether the brace at `pos` opens a namespace, type body or initializer.
    fn is_container(&self, source: &SourceFile, line: usize, code: &str, pos: usize) -> bool {
        let before = code[..pos].trim();
        let header = if before.is_empty() {
            (1..line)
                .rev()
                .map(|n| source.code(n).trim())
                .find(|c| !c.is_empty())
                .unwrap_or("")
        } else {
            before
        };
        let header = header.trim_start_matches(['}', ' ', '\t']);
        header.ends_with('=')
            || header.ends_with(',')
            || header.ends_with('(')
            || self.container.is_match(header)
    }
}

fn is_member_name(ident: &str) -> bool {
    ident.starts_with("m_") || ident.ends_with('_')
}

fn bare_identifier(text: &str) -> Option<&str> {
    let text = text.trim();
    let valid = !text.is_empty()
        && text.starts_with(|c: char| c.is_alphabetic() || c == '_')
        && text.chars().all(|c| c.is_alphanumeric() || c == '_');
    (valid && !matches!(text, "nullptr" | "NULL")).then_some(text)
}

/// Per-function pairing state.
#[derive(Default)]
struct Scope {
    tracks: HashMap<String, Track>,
    violations: Vec<Violation>,
}

impl Scope {
    fn alloc(&mut self, ident: String, kind: Kind, line: usize) {
        let track = self.tracks.entry(ident.clone()).or_default();
        if let Some((first, old)) = track.allocated {
            if track.freed.is_none() && !track.escaped {
                self.violations.push(leak(&ident, first, old));
            }
        }
        *track = Track {
            allocated: Some((line, kind)),
            freed: None,
            escaped: false,
        };
    }

    fn free(&mut self, ident: &str, kind: Kind, line: usize, column: usize, block: usize, open: &[usize]) {
        let track = self.tracks.entry(ident.to_string()).or_default();
        if let Some((first, first_block)) = track.freed {
            if open.contains(&first_block) {
                self.violations.push(
                    Violation::new(
                        DOUBLE_DELETE,
                        Severity::Critical,
                        line,
                        format!("`{ident}` is freed again after line {first} without a new allocation"),
                    )
                    .with_column(column),
                );
                return;
            }
        } else if let Some((alloc_line, alloc_kind)) = track.allocated {
            if alloc_kind != kind {
                self.violations.push(
                    Violation::new(
                        MISMATCHED_DELETE,
                        Severity::Critical,
                        line,
                        format!(
                            "`{ident}` is allocated with {} on line {alloc_line} but released with {}; use {}",
                            alloc_kind.allocator(),
                            kind.deallocator(),
                            alloc_kind.deallocator(),
                        ),
                    )
                    .with_column(column),
                );
            }
        }
        track.freed = Some((line, block));
    }

    fn reassign(&mut self, ident: &str, alias_of: Option<String>) {
        if let Some(alias) = alias_of {
            self.escape(&alias);
        }
        self.tracks.remove(ident);
    }

    fn escape(&mut self, ident: &str) {
        if let Some(track) = self.tracks.get_mut(ident) {
            track.escaped = true;
        }
    }

    fn finish(mut self) -> Vec<Violation> {
        let mut leaks: Vec<Violation> = self
            .tracks
            .iter()
            .filter(|(_, t)| t.freed.is_none() && !t.escaped)
            .filter_map(|(ident, t)| t.allocated.map(|(line, kind)| leak(ident, line, kind)))
            .collect();
        leaks.sort_by(|a, b| a.line.cmp(&b.line).then_with(|| a.description.cmp(&b.description)));
        self.violations.extend(leaks);
        self.violations
    }
}

fn leak(ident: &str, line: usize, kind: Kind) -> Violation {
    Violation::new(
        MEMORY_LEAK,
        Severity::Critical,
        line,
        format!(
            "`{ident}` is allocated with {} but never released with {}",
            kind.allocator(),
            kind.deallocator()
        ),
    )
}

impl Check for Memory {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Flags leaked, mismatched and doubly freed allocations"
    }

    fn triggers(&self) -> &'static [&'static str] {
        &["memory", "delete", "leak", "allocation", "raii"]
    }

    fn default_severity(&self) -> Severity {
        Severity::Critical
    }

    fn check(&self, source: &SourceFile, _guide: &StyleGuide) -> Vec<Violation> {
        let mut violations = Vec::new();
        let mut open_blocks: Vec<usize> = Vec::new();
        let mut next_block = 0usize;
        let mut function: Option<(usize, Scope)> = None;

        for (line, code) in source.code_lines() {
            if crate::scan::is_preprocessor(code) {
                continue;
            }
            for (pos, event) in self.events(code) {
                let column = column_at(code, pos);
                match event {
                    Event::Open => {
                        next_block += 1;
                        open_blocks.push(next_block);
                        if function.is_none() && !self.is_container(source, line, code, pos) {
                            function = Some((open_blocks.len(), Scope::default()));
                        }
                    }
                    Event::Close => {
                        if let Some((depth, _)) = &function {
                            if *depth == open_blocks.len() {
                                if let Some((_, scope)) = function.take() {
                                    violations.extend(scope.finish());
                                }
                            }
                        }
                        open_blocks.pop();
                    }
                    event => {
                        let Some((_, scope)) = function.as_mut() else {
                            continue;
                        };
                        let block = open_blocks.last().copied().unwrap_or(0);
                        match event {
                            Event::Alloc { ident, kind } => scope.alloc(ident, kind, line),
                            Event::Free { ident, kind } => {
                                scope.free(&ident, kind, line, column, block, &open_blocks);
                            }
                            Event::Reassign { ident, alias_of } => scope.reassign(&ident, alias_of),
                            Event::Escape { ident } => scope.escape(&ident),
                            Event::Open | Event::Close => {}
                        }
                    }
                }
            }
        }

        // Unbalanced braces: close the function at end of file.
        if let Some((_, scope)) = function {
            violations.extend(scope.finish());
        }
        violations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(code: &str) -> Vec<Violation> {
        let guide = StyleGuide::parse("CRITICAL\n- Every new must have a matching delete").unwrap();
        Memory::new().check(&SourceFile::new("t.cpp", code), &guide)
    }

    fn kinds(violations: &[Violation]) -> Vec<(&str, usize)> {
        violations.iter().map(|v| (v.kind.as_str(), v.line)).collect()
    }

    #[test]
    fn paired_allocation_passes() {
        let code = "void f() {\n    int* a = new int[10];\n    use(a);\n    delete[] a;\n}\n";
        assert!(run(code).is_empty());
    }

    #[test]
    fn leak_reported_at_allocation() {
        let code = "void f() {\n    int* a = new int[10];\n    use(a);\n}\n";
        let violations = run(code);
        assert_eq!(kinds(&violations), vec![("memory_leak", 2)]);
        assert_eq!(violations[0].severity, Severity::Critical);
        assert!(violations[0].description.contains("new[]"));
    }

    #[test]
    fn array_freed_with_scalar_delete() {
        let code = "void f() {\n    char* buf = new char[64];\n    delete buf;\n}\n";
        let violations = run(code);
        assert_eq!(kinds(&violations), vec![("mismatched_delete", 3)]);
        assert_eq!(violations[0].column, Some(5));
    }

    #[test]
    fn malloc_released_with_delete() {
        let code = "void f() {\n    char* p = (char*)malloc(8);\n    delete p;\n}\n";
        assert_eq!(kinds(&run(code)), vec![("mismatched_delete", 3)]);
    }

    #[test]
    fn double_delete_in_same_block() {
        let code = "void f() {\n    Foo* p = new Foo();\n    delete p;\n    delete p;\n}\n";
        assert_eq!(kinds(&run(code)), vec![("double_delete", 4)]);
    }

    #[test]
    fn delete_in_sibling_branches_is_not_double() {
        let code = "void f(bool c) {\n    Foo* p = new Foo;\n    if (c) {\n        delete p;\n        return;\n    }\n    delete p;\n}\n";
        assert!(run(code).is_empty());
    }

    #[test]
    fn reset_to_nullptr_allows_second_delete() {
        let code = "void f() {\n    Foo* p = new Foo;\n    delete p;\n    p = nullptr;\n    delete p;\n}\n";
        assert!(run(code).is_empty());
    }

    #[test]
    fn returned_pointer_is_not_a_leak() {
        let code = "Foo* make() {\n    Foo* p = new Foo;\n    p->init();\n    return p;\n}\n";
        assert!(run(code).is_empty());
    }

    #[test]
    fn pointer_handed_to_member_is_not_a_leak() {
        let code = "void Holder::set() {\n    int* tmp = new int(3);\n    m_value = tmp;\n}\n";
        assert!(run(code).is_empty());
    }

    #[test]
    fn reassignment_of_live_allocation_leaks() {
        let code = "void f() {\n    int* p = new int;\n    p = new int;\n    delete p;\n}\n";
        assert_eq!(kinds(&run(code)), vec![("memory_leak", 2)]);
    }

    #[test]
    fn class_members_and_namespaces_are_not_functions() {
        let code = "namespace app {\nclass Buffer {\npublic:\n    Buffer() { data = new char[16]; }\n    ~Buffer() { delete[] data; }\nprivate:\n    char* data;\n};\n}\n";
        // Allocation and release live in different functions.
        assert_eq!(kinds(&run(code)), vec![("memory_leak", 4)]);
    }

    #[test]
    fn deleted_functions_and_operator_delete_are_ignored() {
        let code = "struct A {\n    A(const A&) = delete;\n    void operator delete(void* p);\n};\n";
        assert!(run(code).is_empty());
    }

    #[test]
    fn global_initializers_are_ignored() {
        assert!(run("int* g = new int[4];\n").is_empty());
    }
}
