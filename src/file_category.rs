/// File categorization by extension.
///
/// A [`CategoryTable`] is an ordered list of [`Category`] values. Every entry
/// but the last carries a set of extensions; the last entry is the catch-all
/// that receives every file nothing else claims.
///
/// # Examples
///
/// ```
/// use foldersort::file_category::CategoryTable;
/// use std::path::Path;
///
/// let table = CategoryTable::default();
/// assert_eq!(table.classify(Path::new("report.PDF")).name(), "Documents");
/// assert_eq!(table.classify(Path::new("photo.jpg")).name(), "Images");
/// assert_eq!(table.classify(Path::new("mystery.xyz")).name(), "Other");
/// ```
use crate::error::{SortError, SortResult};
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::{Component, Path};
use std::sync::Arc;

/// A named bucket of file extensions mapped to a destination subfolder.
///
/// Extensions are stored lowercase without a leading dot. A category with no
/// extensions is a catch-all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
    name: String,
    folder_name: String,
    icon: String,
    extensions: BTreeSet<String>,
}

impl Category {
    /// Creates a category, normalizing every extension to lowercase and
    /// stripping any leading `.`.
    ///
    /// ```
    /// use foldersort::file_category::Category;
    ///
    /// let docs = Category::new("Documents", "Documents", "📄", [".PDF", "txt"]);
    /// assert!(docs.matches_extension("pdf"));
    /// assert!(docs.matches_extension("TXT"));
    /// ```
    pub fn new<I, S>(name: &str, folder_name: &str, icon: &str, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            name: name.to_string(),
            folder_name: folder_name.to_string(),
            icon: icon.to_string(),
            extensions: extensions
                .into_iter()
                .map(|ext| normalize_extension(ext.as_ref()))
                .filter(|ext| !ext.is_empty())
                .collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the subfolder files of this category are moved into.
    pub fn folder_name(&self) -> &str {
        &self.folder_name
    }

    pub fn icon(&self) -> &str {
        &self.icon
    }

    pub fn extensions(&self) -> &BTreeSet<String> {
        &self.extensions
    }

    /// True when this category has no extensions of its own.
    pub fn is_catch_all(&self) -> bool {
        self.extensions.is_empty()
    }

    /// Case-insensitive extension membership test.
    pub fn matches_extension(&self, ext: &str) -> bool {
        self.extensions.contains(&normalize_extension(ext))
    }
}

fn normalize_extension(ext: &str) -> String {
    ext.trim().trim_start_matches('.').to_lowercase()
}

/// Ordered, validated list of categories used to classify files.
///
/// The table is immutable once built. Replacing the active categories means
/// building a new table.
#[derive(Debug, Clone)]
pub struct CategoryTable {
    categories: Vec<Arc<Category>>,
}

impl CategoryTable {
    /// Builds a table from an ordered list of categories.
    ///
    /// # Errors
    ///
    /// Returns [`SortError::InvalidConfiguration`] when the list is empty,
    /// when the catch-all category is missing, duplicated or not last, or
    /// when a folder name is not a single plain path component.
    pub fn new(categories: Vec<Category>) -> SortResult<Self> {
        if categories.is_empty() {
            return Err(SortError::InvalidConfiguration(
                "category table must not be empty".to_string(),
            ));
        }

        let catch_all_count = categories.iter().filter(|c| c.is_catch_all()).count();
        let last_is_catch_all = categories.last().is_some_and(Category::is_catch_all);
        if catch_all_count != 1 || !last_is_catch_all {
            return Err(SortError::InvalidConfiguration(
                "exactly one catch-all category (no extensions) must be the last entry"
                    .to_string(),
            ));
        }

        for category in &categories {
            validate_folder_name(category)?;
        }

        Ok(Self {
            categories: categories.into_iter().map(Arc::new).collect(),
        })
    }

    /// Returns the category for a file path.
    ///
    /// Categories are tried in table order, skipping the catch-all; the first
    /// one whose extension set contains the file's lowercase extension wins.
    /// Files without a match (or without an extension) get the catch-all.
    pub fn classify(&self, file_path: &Path) -> &Arc<Category> {
        if let Some(ext) = file_path.extension() {
            let ext = ext.to_string_lossy().to_lowercase();
            let specific = &self.categories[..self.categories.len() - 1];
            if let Some(category) = specific.iter().find(|c| c.extensions.contains(&ext)) {
                return category;
            }
        }
        self.catch_all()
    }

    /// The fallback category, always the last entry.
    pub fn catch_all(&self) -> &Arc<Category> {
        // `new` guarantees at least one entry
        &self.categories[self.categories.len() - 1]
    }

    /// Looks a category up by its display name.
    pub fn get(&self, name: &str) -> Option<&Arc<Category>> {
        self.categories.iter().find(|c| c.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Category>> {
        self.categories.iter()
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// The categories shipped with the tool.
    pub fn default_categories() -> Vec<Category> {
        vec![
            Category::new(
                "Documents",
                "Documents",
                "📄",
                [
                    "pdf", "doc", "docx", "txt", "rtf", "odt", "md", "epub", "xls", "xlsx", "ods",
                    "csv", "ppt", "pptx", "odp",
                ],
            ),
            Category::new(
                "Images",
                "Images",
                "🖼️",
                [
                    "jpg", "jpeg", "png", "gif", "bmp", "svg", "webp", "ico", "tif", "tiff", "heic",
                    "raw", "psd",
                ],
            ),
            Category::new(
                "Videos",
                "Videos",
                "🎬",
                [
                    "mp4", "avi", "mkv", "mov", "wmv", "flv", "webm", "m4v", "mpg", "mpeg", "3gp",
                ],
            ),
            Category::new(
                "Audio",
                "Audio",
                "🎵",
                ["mp3", "wav", "flac", "aac", "ogg", "wma", "m4a", "opus", "mid", "midi"],
            ),
            Category::new(
                "Archives",
                "Archives",
                "📦",
                ["zip", "rar", "7z", "tar", "gz", "bz2", "xz", "tgz", "iso"],
            ),
            Category::new(
                "Software",
                "Software",
                "💿",
                ["exe", "msi", "dmg", "pkg", "deb", "rpm", "apk", "appimage"],
            ),
            Category::new(
                "Code",
                "Code",
                "💻",
                [
                    "rs", "py", "js", "ts", "html", "css", "java", "c", "cpp", "h", "hpp", "cs",
                    "go", "php", "rb", "sh", "ps1", "json", "xml", "yaml", "yml", "toml", "sql",
                ],
            ),
            Category::new("Other", "Other", "📁", Vec::<String>::new()),
        ]
    }
}

impl Default for CategoryTable {
    fn default() -> Self {
        Self {
            categories: Self::default_categories().into_iter().map(Arc::new).collect(),
        }
    }
}

fn validate_folder_name(category: &Category) -> SortResult<()> {
    let mut components = Path::new(&category.folder_name).components();
    let single_normal = matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    );
    if !single_normal || category.folder_name.contains(['/', '\\']) {
        return Err(SortError::InvalidConfiguration(format!(
            "category '{}' has invalid folder name '{}'",
            category.name, category.folder_name
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table_order() {
        let table = CategoryTable::default();
        let names: Vec<&str> = table.iter().map(|c| c.name()).collect();
        assert_eq!(
            names,
            vec![
                "Documents", "Images", "Videos", "Audio", "Archives", "Software", "Code", "Other"
            ]
        );
        assert!(table.catch_all().is_catch_all());
    }

    #[test]
    fn test_default_table_passes_validation() {
        assert!(CategoryTable::new(CategoryTable::default_categories()).is_ok());
    }

    #[test]
    fn test_classify_case_insensitive() {
        let table = CategoryTable::default();
        assert_eq!(table.classify(Path::new("REPORT.PDF")).name(), "Documents");
        assert_eq!(table.classify(Path::new("Song.Mp3")).name(), "Audio");
        assert_eq!(table.classify(Path::new("setup.EXE")).name(), "Software");
    }

    #[test]
    fn test_classify_uses_last_extension() {
        let table = CategoryTable::default();
        assert_eq!(table.classify(Path::new("backup.tar.gz")).name(), "Archives");
        assert_eq!(table.classify(Path::new("notes.pdf.rs")).name(), "Code");
    }

    #[test]
    fn test_classify_falls_back_to_catch_all() {
        let table = CategoryTable::default();
        assert_eq!(table.classify(Path::new("Makefile")).name(), "Other");
        assert_eq!(table.classify(Path::new("data.unknownext")).name(), "Other");
        assert_eq!(table.classify(Path::new("trailing.")).name(), "Other");
    }

    #[test]
    fn test_catch_all_iff_no_specific_match() {
        let table = CategoryTable::default();
        for name in ["a.pdf", "b.png", "c.mkv", "d.flac", "e.7z", "f.msi", "g.rs", "h.zzz", "i"] {
            let path = Path::new(name);
            let claimed = path.extension().is_some_and(|ext| {
                table
                    .iter()
                    .filter(|c| !c.is_catch_all())
                    .any(|c| c.matches_extension(&ext.to_string_lossy()))
            });
            assert_eq!(table.classify(path).is_catch_all(), !claimed, "{name}");
        }
    }

    #[test]
    fn test_classify_is_deterministic() {
        let table = CategoryTable::default();
        let first = table.classify(Path::new("clip.mov"));
        let second = table.classify(Path::new("clip.mov"));
        assert!(Arc::ptr_eq(first, second));
    }

    #[test]
    fn test_earlier_category_wins_on_overlap() {
        let table = CategoryTable::new(vec![
            Category::new("First", "first", "1", ["dup"]),
            Category::new("Second", "second", "2", ["dup", "only"]),
            Category::new("Rest", "rest", "*", Vec::<String>::new()),
        ])
        .expect("valid table");

        assert_eq!(table.classify(Path::new("x.dup")).name(), "First");
        assert_eq!(table.classify(Path::new("x.only")).name(), "Second");
    }

    #[test]
    fn test_extensions_normalized() {
        let category = Category::new("Docs", "docs", "d", [".PDF", " Txt "]);
        let exts: Vec<&String> = category.extensions().iter().collect();
        assert_eq!(exts, vec!["pdf", "txt"]);
    }

    #[test]
    fn test_empty_table_rejected() {
        let result = CategoryTable::new(Vec::new());
        assert!(matches!(result, Err(SortError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_missing_catch_all_rejected() {
        let result = CategoryTable::new(vec![Category::new("Docs", "docs", "d", ["pdf"])]);
        assert!(matches!(result, Err(SortError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_catch_all_not_last_rejected() {
        let result = CategoryTable::new(vec![
            Category::new("Rest", "rest", "*", Vec::<String>::new()),
            Category::new("Docs", "docs", "d", ["pdf"]),
        ]);
        assert!(matches!(result, Err(SortError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_two_catch_alls_rejected() {
        let result = CategoryTable::new(vec![
            Category::new("Misc", "misc", "?", Vec::<String>::new()),
            Category::new("Rest", "rest", "*", Vec::<String>::new()),
        ]);
        assert!(matches!(result, Err(SortError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_bad_folder_names_rejected() {
        for folder in ["", "..", ".", "a/b", "a\\b"] {
            let result = CategoryTable::new(vec![
                Category::new("Docs", folder, "d", ["pdf"]),
                Category::new("Rest", "rest", "*", Vec::<String>::new()),
            ]);
            assert!(result.is_err(), "folder name {folder:?} should be rejected");
        }
    }

    #[test]
    fn test_get_by_name() {
        let table = CategoryTable::default();
        assert_eq!(table.get("Videos").map(|c| c.folder_name()), Some("Videos"));
        assert!(table.get("Fonts").is_none());
    }
}
