//! 通用表格背后的数据变换
//!
//! 行是普通的 JSON 对象。过滤和排序不修改行数据，只产生借用行的有序视图。

use serde::Serialize;
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

pub type Row = Map<String, Value>;

/// 自定义单元格渲染：接收单元格值和整行
pub type Formatter = Arc<dyn Fn(&Value, &Row) -> String + Send + Sync>;

pub const DEFAULT_EMPTY_TEXT: &str = "Nenhum registro encontrado.";

#[derive(Clone)]
pub struct Column {
    pub key: String,
    pub title: String,
    formatter: Option<Formatter>,
}

impl Column {
    pub fn new(key: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            title: title.into(),
            formatter: None,
        }
    }

    pub fn with_formatter<F>(mut self, formatter: F) -> Self
    where
        F: Fn(&Value, &Row) -> String + Send + Sync + 'static,
    {
        self.formatter = Some(Arc::new(formatter));
        self
    }

    /// `row` 在本列显示的文本
    pub fn cell_text(&self, row: &Row) -> String {
        let value = row.get(&self.key).unwrap_or(&Value::Null);
        match &self.formatter {
            Some(format) => format(value, row),
            None => value_text(value),
        }
    }
}

impl fmt::Debug for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("key", &self.key)
            .field("title", &self.title)
            .field("formatter", &self.formatter.is_some())
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    pub fn indicator(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "▲",
            SortDirection::Descending => "▼",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortState {
    pub key: String,
    pub direction: SortDirection,
}

/// 单个表格实例的临时视图状态，默认不过滤、不排序
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TableView {
    pub query: String,
    pub sort: Option<SortState>,
}

impl TableView {
    /// 点击表头：当前排序列翻转方向，其他列以升序成为排序列
    pub fn toggle_sort(&mut self, key: &str) {
        self.sort = Some(match self.sort.take() {
            Some(state) if state.key == key => SortState {
                key: state.key,
                direction: state.direction.flipped(),
            },
            _ => SortState {
                key: key.to_string(),
                direction: SortDirection::Ascending,
            },
        });
    }

    pub fn sort_indicator(&self, key: &str) -> &'static str {
        match &self.sort {
            Some(state) if state.key == key => state.direction.indicator(),
            _ => "",
        }
    }
}

/// 渲染表格所需的全部数据，`rows` 为快照
#[derive(Debug, Clone)]
pub struct TableSpec {
    pub columns: Vec<Column>,
    pub rows: Vec<Row>,
    /// 过滤框搜索的键；为空时搜索每行的所有键
    pub filter_keys: Vec<String>,
    pub empty_text: String,
}

impl TableSpec {
    pub fn new(columns: Vec<Column>, rows: Vec<Row>) -> Self {
        Self {
            columns,
            rows,
            filter_keys: Vec::new(),
            empty_text: DEFAULT_EMPTY_TEXT.to_string(),
        }
    }

    pub fn with_filter_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for key in keys {
            let key = key.into();
            if !self.filter_keys.contains(&key) {
                self.filter_keys.push(key);
            }
        }
        self
    }

    pub fn with_empty_text(mut self, text: impl Into<String>) -> Self {
        self.empty_text = text.into();
        self
    }

    /// 过滤后的行，按显示顺序
    pub fn visible_rows(&self, view: &TableView) -> Vec<&Row> {
        let mut rows = filter_rows(&self.rows, &view.query, &self.filter_keys);
        if let Some(sort) = &view.sort {
            sort_rows(&mut rows, &sort.key, sort.direction);
        }
        rows
    }

    /// 可见行的单元格文本，每行一个 Vec
    pub fn cells(&self, view: &TableView) -> Vec<Vec<String>> {
        self.visible_rows(view)
            .into_iter()
            .map(|row| self.columns.iter().map(|c| c.cell_text(row)).collect())
            .collect()
    }
}

/// 单元格值转文本，`null` 为空串
pub fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

fn searchable_text(row: &Row, keys: &[String]) -> String {
    let parts: Vec<String> = if keys.is_empty() {
        row.values().map(value_text).collect()
    } else {
        keys.iter()
            .map(|k| row.get(k).map(value_text).unwrap_or_default())
            .collect()
    };
    parts.join(" ").to_lowercase()
}

/// 不区分大小写的子串过滤
///
/// # 参数
/// - `rows`: 全部行
/// - `query`: 过滤文本；空白时保留所有行
/// - `keys`: 参与匹配的键；为空时匹配每行的所有键
pub fn filter_rows<'a>(rows: &'a [Row], query: &str, keys: &[String]) -> Vec<&'a Row> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return rows.iter().collect();
    }
    rows.iter()
        .filter(|row| searchable_text(row, keys).contains(&needle))
        .collect()
}

fn as_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) if !s.trim().is_empty() => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

/// 两侧都能解析为有限数字时按数值比较，否则按文本比较
///
/// 分支按每一对值选择，因此混合数字与文本的列不构成全序
/// （`9 < 10`、`"10" < "1x"`、`"1x" < "9"`）。
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    if let (Some(x), Some(y)) = (as_number(a), as_number(b)) {
        return x.partial_cmp(&y).unwrap_or(Ordering::Equal);
    }
    let (a, b) = (value_text(a), value_text(b));
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(&b))
}

/// 按 `key` 稳定升序排序；降序即升序结果的完全反转。
///
/// 比较函数按对选择数值或文本分支，不构成全序，因此不能交给
/// `slice::sort_by`（Rust 1.81 起会检测并 panic）。这里使用本地归并排序，
/// 对任意比较结果都只产生一个排列。
pub fn sort_rows(rows: &mut [&Row], key: &str, direction: SortDirection) {
    merge_sort_by(rows, &|a: &&Row, b: &&Row| {
        compare_values(
            a.get(key).unwrap_or(&Value::Null),
            b.get(key).unwrap_or(&Value::Null),
        )
    });
    if direction == SortDirection::Descending {
        rows.reverse();
    }
}

/// 自顶向下的稳定归并排序
///
/// 只有右侧严格小于左侧时才取右侧元素，保证相等元素保持原有顺序。
fn merge_sort_by<T, F>(items: &mut [T], compare: &F)
where
    T: Copy,
    F: Fn(&T, &T) -> Ordering,
{
    let len = items.len();
    if len <= 1 {
        return;
    }
    let mid = len / 2;
    merge_sort_by(&mut items[..mid], compare);
    merge_sort_by(&mut items[mid..], compare);

    let mut merged = Vec::with_capacity(len);
    let (mut left, mut right) = (0, mid);
    while left < mid && right < len {
        if compare(&items[right], &items[left]) == Ordering::Less {
            merged.push(items[right]);
            right += 1;
        } else {
            merged.push(items[left]);
            left += 1;
        }
    }
    merged.extend_from_slice(&items[left..mid]);
    merged.extend_from_slice(&items[right..]);
    items.copy_from_slice(&merged);
}

/// 把 JSON 对象数组转换为行，非对象元素被跳过
pub fn rows_from_value(value: Value) -> Vec<Row> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::Object(map) => Some(map),
                _ => None,
            })
            .collect(),
        Value::Object(map) => vec![map],
        _ => Vec::new(),
    }
}

pub fn rows_from_serialize<T: Serialize>(items: &[T]) -> Vec<Row> {
    serde_json::to_value(items)
        .map(rows_from_value)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rows(value: Value) -> Vec<Row> {
        rows_from_value(value)
    }

    fn column_texts(spec: &TableSpec, view: &TableView, col: usize) -> Vec<String> {
        spec.cells(view).into_iter().map(|r| r[col].clone()).collect()
    }

    fn id_name_spec() -> TableSpec {
        TableSpec::new(
            vec![Column::new("id", "ID"), Column::new("name", "Nome")],
            rows(json!([{"id": 2, "name": "B"}, {"id": 1, "name": "A"}])),
        )
    }

    #[test]
    fn test_header_clicks_sort_then_reverse() {
        let spec = id_name_spec();
        let mut view = TableView::default();

        view.toggle_sort("id");
        assert_eq!(column_texts(&spec, &view, 1), vec!["A", "B"]);

        view.toggle_sort("id");
        assert_eq!(column_texts(&spec, &view, 1), vec!["B", "A"]);
    }

    #[test]
    fn test_other_column_resets_to_ascending() {
        let mut view = TableView::default();
        view.toggle_sort("id");
        view.toggle_sort("id");
        view.toggle_sort("name");
        assert_eq!(
            view.sort,
            Some(SortState {
                key: "name".into(),
                direction: SortDirection::Ascending
            })
        );
        assert_eq!(view.sort_indicator("name"), "▲");
        assert_eq!(view.sort_indicator("id"), "");
    }

    #[test]
    fn test_default_view_is_idempotent() {
        let spec = id_name_spec();
        let first = spec.cells(&TableView::default());
        let second = spec.cells(&TableView::default());
        assert_eq!(first, second);
        assert_eq!(first, vec![vec!["2", "B"], vec!["1", "A"]]);
    }

    #[test]
    fn test_descending_is_exact_reverse_for_numbers() {
        let spec = TableSpec::new(
            vec![Column::new("qty", "Qtd"), Column::new("tag", "Tag")],
            rows(json!([
                {"qty": 3, "tag": "a"},
                {"qty": "10", "tag": "b"},
                {"qty": 3, "tag": "c"},
                {"qty": -1.5, "tag": "d"},
                {"qty": 0, "tag": "e"}
            ])),
        );
        let mut view = TableView::default();
        view.toggle_sort("qty");
        let asc = column_texts(&spec, &view, 1);
        view.toggle_sort("qty");
        let mut desc = column_texts(&spec, &view, 1);
        desc.reverse();
        assert_eq!(asc, desc);
        assert_eq!(asc, vec!["d", "e", "a", "c", "b"]);
    }

    #[test]
    fn test_numbers_compare_numerically_text_lexically() {
        assert_eq!(compare_values(&json!(9), &json!("10")), Ordering::Less);
        assert_eq!(compare_values(&json!("b"), &json!("A")), Ordering::Greater);
        assert_eq!(compare_values(&json!(null), &json!("a")), Ordering::Less);
    }

    #[test]
    fn test_mixed_column_has_no_total_order() {
        // 已知限制：数值/文本分支按每一对值选择
        assert_eq!(compare_values(&json!(9), &json!(10)), Ordering::Less);
        assert_eq!(compare_values(&json!(10), &json!("1x")), Ordering::Less);
        assert_eq!(compare_values(&json!("1x"), &json!(9)), Ordering::Less);
    }

    #[test]
    fn test_mixed_column_sort_keeps_every_row() {
        // 线性同余生成器，保证用例可复现
        let mut seed: u64 = 0x2545_f491_4f6c_dd1d;
        let mut next = move || {
            seed = seed
                .wrapping_mul(6_364_136_223_846_793_005)
                .wrapping_add(1_442_695_040_888_963_407);
            (seed >> 33) as usize
        };
        let pool = [json!(9), json!("9x"), json!("9"), json!("10"), json!("1x"), json!(10.5)];

        for _ in 0..300 {
            let data: Vec<Value> = (0..40)
                .map(|i| json!({ "k": pool[next() % pool.len()].clone(), "i": i }))
                .collect();
            let spec = TableSpec::new(
                vec![Column::new("k", "K"), Column::new("i", "I")],
                rows(Value::Array(data)),
            );
            let mut view = TableView::default();

            view.toggle_sort("k");
            let asc = column_texts(&spec, &view, 1);
            let mut seen = asc.clone();
            seen.sort_by_key(|t| t.parse::<usize>().unwrap());
            assert_eq!(seen, (0..40).map(|i| i.to_string()).collect::<Vec<_>>());

            view.toggle_sort("k");
            let mut desc = column_texts(&spec, &view, 1);
            desc.reverse();
            assert_eq!(asc, desc);
        }
    }

    #[test]
    fn test_filter_matches_every_key_by_default() {
        let data = rows(json!([
            {"sku": "ABC-1", "name": "Parafuso"},
            {"sku": "XYZ-2", "name": "Porca"},
            {"sku": "QQQ-3", "name": "Arruela", "note": "abc"}
        ]));
        let hits = filter_rows(&data, "AbC", &[]);
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn test_filter_keys_restrict_the_search() {
        let spec = TableSpec::new(
            vec![Column::new("sku", "SKU")],
            rows(json!([
                {"sku": "ABC-1", "name": "Parafuso"},
                {"sku": "XYZ-2", "name": "abc"}
            ])),
        )
        .with_filter_keys(["sku", "sku"]);
        assert_eq!(spec.filter_keys, vec!["sku"]);

        let view = TableView {
            query: "abc".into(),
            sort: None,
        };
        assert_eq!(spec.cells(&view), vec![vec!["ABC-1"]]);
    }

    #[test]
    fn test_filter_law_every_visible_row_contains_query() {
        let data = rows(json!([
            {"id": 1, "name": "Caneta Azul"},
            {"id": 2, "name": "caneta preta"},
            {"id": 12, "name": "Lápis"},
            {"id": 3, "name": null}
        ]));
        for q in ["caneta", "AZUL", "1", "lá", "zzz", " "] {
            let needle = q.trim().to_lowercase();
            let hits = filter_rows(&data, q, &[]);
            for row in &hits {
                assert!(searchable_text(row, &[]).contains(&needle));
            }
            let misses = data
                .iter()
                .filter(|r| !searchable_text(r, &[]).contains(&needle))
                .count();
            assert_eq!(hits.len() + misses, data.len());
        }
    }

    #[test]
    fn test_sorting_leaves_snapshot_untouched() {
        let spec = id_name_spec();
        let mut view = TableView::default();
        view.toggle_sort("name");
        let _ = spec.visible_rows(&view);
        assert_eq!(spec.rows[0]["id"], json!(2));
    }

    #[test]
    fn test_no_match_yields_empty_view() {
        let spec = id_name_spec().with_empty_text("Sem produtos.");
        let view = TableView {
            query: "nothing".into(),
            sort: None,
        };
        assert!(spec.visible_rows(&view).is_empty());
        assert_eq!(spec.empty_text, "Sem produtos.");
    }

    #[test]
    fn test_formatter_and_null_rendering() {
        let col = Column::new("balance", "Saldo").with_formatter(|v, row| {
            format!("{} {}", value_text(v), value_text(&row["unit"]))
        });
        let data = rows(json!([{"balance": 4.5, "unit": "kg", "note": null}]));
        assert_eq!(col.cell_text(&data[0]), "4.5 kg");
        assert_eq!(Column::new("note", "Obs").cell_text(&data[0]), "");
        assert_eq!(Column::new("missing", "?").cell_text(&data[0]), "");
    }

    #[test]
    fn test_rows_from_serialize() {
        #[derive(Serialize)]
        struct Item {
            id: i64,
        }
        let rows = rows_from_serialize(&[Item { id: 1 }, Item { id: 2 }]);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1]["id"], json!(2));
        assert!(rows_from_value(json!([1, "x"])).is_empty());
    }
}
