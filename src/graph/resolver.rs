//! Dependency identifier resolution
//!
//! Maps raw identifiers (`./utils`, `../lib/db.js`, `app.models.user`,
//! `lodash`) onto node ids of the current corpus. Anything that does not land
//! on a known file is dropped by the caller.

use rustc_hash::FxHashMap;

/// Lookup tables built once over the complete node id list
pub struct DependencyResolver<'a> {
    extensions: &'a [String],
    /// Normalized full path -> node index
    by_path: FxHashMap<String, usize>,
    /// Normalized path without extension -> node index (first seen)
    by_stem_path: FxHashMap<String, usize>,
    /// `stem` and `parentDir/stem` -> node index (first seen)
    by_name: FxHashMap<String, usize>,
}

impl<'a> DependencyResolver<'a> {
    pub fn new<S: AsRef<str>>(ids: &[S], extensions: &'a [String]) -> Self {
        let mut by_path = FxHashMap::default();
        let mut by_stem_path = FxHashMap::default();
        let mut by_name = FxHashMap::default();

        for (idx, id) in ids.iter().enumerate() {
            let path = clean_path(id.as_ref());
            let without_ext = strip_extension(&path).to_string();

            let (parent, stem) = split_parent(&without_ext);
            by_name.entry(stem.to_string()).or_insert(idx);
            if let Some(parent) = parent {
                let parent_name = parent.rsplit('/').next().unwrap_or(parent);
                by_name.entry(format!("{}/{}", parent_name, stem)).or_insert(idx);
            }

            by_stem_path.entry(without_ext).or_insert(idx);
            by_path.entry(path).or_insert(idx);
        }

        Self {
            extensions,
            by_path,
            by_stem_path,
            by_name,
        }
    }

    /// Resolve `raw`, declared in file `from`, to a node index
    pub fn resolve(&self, from: &str, raw: &str) -> Option<usize> {
        let raw = raw.trim().replace('\\', "/");
        if raw.is_empty() {
            return None;
        }

        if is_relative(&raw) {
            self.resolve_relative(from, &raw)
        } else {
            self.resolve_direct(&raw)
        }
    }

    fn resolve_relative(&self, from: &str, raw: &str) -> Option<usize> {
        let from = clean_path(from);
        let base = match split_parent(&from).0 {
            Some(dir) => format!("{}/{}", dir, raw),
            None => raw.to_string(),
        };
        let joined = normalize_path(&base)?;

        if let Some(&idx) = self.by_path.get(&joined) {
            return Some(idx);
        }
        for ext in self.extensions {
            if let Some(&idx) = self.by_path.get(&format!("{}{}", joined, ext)) {
                return Some(idx);
            }
        }
        for ext in self.extensions {
            if let Some(&idx) = self.by_path.get(&format!("{}/index{}", joined, ext)) {
                return Some(idx);
            }
        }
        None
    }

    fn resolve_direct(&self, raw: &str) -> Option<usize> {
        let raw = raw.trim_start_matches('/');
        if let Some(&idx) = self.by_path.get(raw) {
            return Some(idx);
        }

        let without_ext = self.strip_known_extension(raw);
        if let Some(&idx) = self.by_stem_path.get(without_ext) {
            return Some(idx);
        }

        // Dotted module path: app.models.user -> app/models/user
        let module_path = if !without_ext.contains('/') && without_ext.contains('.') {
            let slashed = without_ext.trim_matches('.').replace('.', "/");
            if let Some(&idx) = self.by_stem_path.get(&slashed) {
                return Some(idx);
            }
            slashed
        } else {
            without_ext.to_string()
        };

        let (parent, stem) = split_parent(&module_path);
        if let Some(parent) = parent {
            let parent_name = parent.rsplit('/').next().unwrap_or(parent);
            if let Some(&idx) = self.by_name.get(&format!("{}/{}", parent_name, stem)) {
                return Some(idx);
            }
        }
        self.by_name.get(stem).copied()
    }

    fn strip_known_extension<'s>(&self, raw: &'s str) -> &'s str {
        self.extensions
            .iter()
            .find_map(|ext| raw.strip_suffix(ext.as_str()))
            .filter(|s| !s.is_empty())
            .unwrap_or(raw)
    }
}

fn is_relative(raw: &str) -> bool {
    raw == "." || raw == ".." || raw.starts_with("./") || raw.starts_with("../")
}

/// Forward slashes with `.` and `..` segments resolved where possible
fn clean_path(path: &str) -> String {
    let path = path.replace('\\', "/");
    normalize_path(&path).unwrap_or(path)
}

/// Lexically resolve `.` and `..` segments; None when `..` escapes the root
fn normalize_path(path: &str) -> Option<String> {
    let mut parts: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                parts.pop()?;
            }
            s => parts.push(s),
        }
    }
    Some(parts.join("/"))
}

/// Path with the final extension removed (`src/a.test.js` -> `src/a.test`)
fn strip_extension(path: &str) -> &str {
    let name_start = path.rfind('/').map(|i| i + 1).unwrap_or(0);
    match path[name_start..].rfind('.') {
        Some(dot) if dot > 0 => &path[..name_start + dot],
        _ => path,
    }
}

fn split_parent(path: &str) -> (Option<&str>, &str) {
    match path.rfind('/') {
        Some(i) => (Some(&path[..i]), &path[i + 1..]),
        None => (None, path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exts() -> Vec<String> {
        vec![".js".into(), ".ts".into(), ".py".into()]
    }

    fn ids() -> Vec<&'static str> {
        vec![
            "src/index.js",
            "src/utils/format.js",
            "src/lib/index.ts",
            "app/models/user.py",
            "app/views/user.py",
            "lodash.js",
        ]
    }

    #[test]
    fn test_relative_with_extension_lookup() {
        let exts = exts();
        let ids = ids();
        let r = DependencyResolver::new(&ids, &exts);
        assert_eq!(r.resolve("src/index.js", "./utils/format"), Some(1));
        assert_eq!(r.resolve("src/utils/format.js", "../index.js"), Some(0));
    }

    #[test]
    fn test_relative_directory_index() {
        let exts = exts();
        let ids = ids();
        let r = DependencyResolver::new(&ids, &exts);
        assert_eq!(r.resolve("src/index.js", "./lib"), Some(2));
    }

    #[test]
    fn test_relative_escaping_root() {
        let exts = exts();
        let ids = ids();
        let r = DependencyResolver::new(&ids, &exts);
        assert_eq!(r.resolve("lodash.js", "../../outside"), None);
    }

    #[test]
    fn test_dotted_module_path() {
        let exts = exts();
        let ids = ids();
        let r = DependencyResolver::new(&ids, &exts);
        assert_eq!(r.resolve("app/views/user.py", "app.models.user"), Some(3));
    }

    #[test]
    fn test_parent_stem_and_stem() {
        let exts = exts();
        let ids = ids();
        let r = DependencyResolver::new(&ids, &exts);
        assert_eq!(r.resolve("src/index.js", "views/user"), Some(4));
        // stem collision: first seen wins
        assert_eq!(r.resolve("src/index.js", "user"), Some(3));
        assert_eq!(r.resolve("src/index.js", "lodash"), Some(5));
    }

    #[test]
    fn test_unresolved() {
        let exts = exts();
        let ids = ids();
        let r = DependencyResolver::new(&ids, &exts);
        assert_eq!(r.resolve("src/index.js", "react"), None);
        assert_eq!(r.resolve("src/index.js", "  "), None);
    }

    #[test]
    fn test_strip_extension() {
        assert_eq!(strip_extension("src/a.test.js"), "src/a.test");
        assert_eq!(strip_extension("src/.hidden"), "src/.hidden");
        assert_eq!(strip_extension("Makefile"), "Makefile");
    }
}
