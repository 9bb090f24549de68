use sea_orm::{
    ColumnTrait, Condition, EntityName, IdenStatic,
    sea_query::{Expr, LikeExpr, SimpleExpr},
};
use serde::Deserialize;

use super::{Catalog, Field};
use crate::{config::ParamPolicy, error::AppResult};

/// Raw listing parameters exactly as they arrive in the query string.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogQuery {
    pub age_group: Option<String>,
    pub min_age: Option<String>,
    pub max_age: Option<String>,
    pub min_players: Option<String>,
    pub max_players: Option<String>,
    pub complexity: Option<String>,
    pub featured: Option<String>,
    pub editor_choice: Option<String>,
    pub search: Option<String>,
    pub categories: Option<String>,
    pub skills: Option<String>,
    pub themes: Option<String>,
    pub sort: Option<String>,
    pub order: Option<String>,
    pub limit: Option<String>,
    pub offset: Option<String>,
}

/// Coarse named age range used as an alternative match path.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct AgeBucket {
    pub key: &'static str,
    pub min: i32,
    pub max: i32,
}

pub const AGE_BUCKETS: [AgeBucket; 4] = [
    AgeBucket { key: "0-3", min: 0, max: 3 },
    AgeBucket { key: "3-6", min: 3, max: 6 },
    AgeBucket { key: "7-10", min: 7, max: 10 },
    AgeBucket { key: "11-15", min: 11, max: 15 },
];

impl AgeBucket {
    pub fn lookup(key: &str) -> Option<Self> {
        let key = key.trim();
        AGE_BUCKETS.iter().copied().find(|b| b.key == key)
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Filter {
    pub age_bucket: Option<AgeBucket>,
    pub min_age: Option<i32>,
    pub max_age: Option<i32>,
    pub min_players: Option<i32>,
    pub max_players: Option<i32>,
    pub complexity: Option<String>,
    pub featured: bool,
    pub editor_choice: bool,
    pub search: Option<String>,
    pub categories: Vec<String>,
    pub skills: Vec<String>,
    pub themes: Vec<String>,
}

impl Filter {
    pub fn from_query(q: &CatalogQuery, policy: ParamPolicy) -> AppResult<Self> {
        Ok(Self {
            age_bucket: q.age_group.as_deref().and_then(AgeBucket::lookup),
            min_age: parse_number("minAge", q.min_age.as_deref(), policy)?,
            max_age: parse_number("maxAge", q.max_age.as_deref(), policy)?,
            min_players: parse_number("minPlayers", q.min_players.as_deref(), policy)?,
            max_players: parse_number("maxPlayers", q.max_players.as_deref(), policy)?,
            complexity: non_blank(q.complexity.as_deref()),
            featured: is_true(q.featured.as_deref()),
            editor_choice: is_true(q.editor_choice.as_deref()),
            search: non_blank(q.search.as_deref()),
            categories: tag_list(q.categories.as_deref()),
            skills: tag_list(q.skills.as_deref()),
            themes: tag_list(q.themes.as_deref()),
        })
    }

    /// Conjunction of every constraint this filter carries. Constraints on
    /// columns the catalog lacks are dropped.
    pub fn condition<C: Catalog>(&self) -> Condition {
        let mut all = Condition::all();

        if let Some(bucket) = self.age_bucket {
            if let (Some(group), Some(min), Some(max)) = (
                C::column(Field::AgeGroup),
                C::column(Field::MinAge),
                C::column(Field::MaxAge),
            ) {
                all = all.add(
                    Condition::any().add(group.eq(bucket.key)).add(
                        Condition::all().add(min.lte(bucket.max)).add(max.gte(bucket.min)),
                    ),
                );
            }
        }

        if let (Some(value), Some(column)) = (self.min_age, C::column(Field::MinAge)) {
            all = all.add(column.lte(value));
        }
        if let (Some(value), Some(column)) = (self.max_age, C::column(Field::MaxAge)) {
            all = all.add(column.gte(value));
        }
        if let (Some(value), Some(column)) = (self.min_players, C::column(Field::MaxPlayers)) {
            all = all.add(column.gte(value));
        }
        if let (Some(value), Some(column)) = (self.max_players, C::column(Field::MinPlayers)) {
            all = all.add(column.lte(value));
        }
        if let (Some(value), Some(column)) = (&self.complexity, C::column(Field::Complexity)) {
            all = all.add(column.eq(value.as_str()));
        }
        if self.featured {
            if let Some(column) = C::column(Field::Featured) {
                all = all.add(column.eq(true));
            }
        }
        if self.editor_choice {
            if let Some(column) = C::column(Field::EditorChoice) {
                all = all.add(column.eq(true));
            }
        }

        if let Some(text) = &self.search {
            if let Some(matches) = search_condition::<C>(text) {
                all = all.add(matches);
            }
        }

        for (field, entries) in [
            (Field::Categories, &self.categories),
            (Field::Skills, &self.skills),
            (Field::Themes, &self.themes),
        ] {
            if let Some(expr) = tag_membership::<C>(field, entries) {
                all = all.add(expr);
            }
        }

        all
    }
}

/// Upper-case letters outside ASCII that SQLite's `lower()` leaves alone.
const EXTRA_FOLDS: [(char, char); 7] = [
    ('Æ', 'æ'),
    ('Ø', 'ø'),
    ('Å', 'å'),
    ('Ä', 'ä'),
    ('Ö', 'ö'),
    ('Ü', 'ü'),
    ('É', 'é'),
];

/// Case fold applied to user input. Matches [`fold_sql`] character for
/// character, so stored text always matches itself.
pub fn fold(text: &str) -> String {
    text.chars()
        .map(|c| {
            EXTRA_FOLDS
                .iter()
                .find(|(upper, _)| *upper == c)
                .map_or(c.to_ascii_lowercase(), |&(_, lower)| lower)
        })
        .collect()
}

/// SQL expression folding `operand` the same way [`fold`] folds input.
fn fold_sql(operand: &str) -> String {
    let replaced = EXTRA_FOLDS
        .iter()
        .fold(operand.to_string(), |sql, (upper, lower)| {
            format!("replace({sql}, '{upper}', '{lower}')")
        });
    format!("lower({replaced})")
}

fn qualified<C: Catalog>(column: C::Column) -> String {
    format!("\"{}\".\"{}\"", C::default().table_name(), IdenStatic::as_str(&column))
}

/// True when the JSON array stored in `field` holds any of `entries`,
/// compared case-insensitively element by element. Malformed arrays count as
/// empty.
pub fn tag_membership<C: Catalog>(field: Field, entries: &[String]) -> Option<SimpleExpr> {
    if entries.is_empty() {
        return None;
    }
    let column = qualified::<C>(C::column(field)?);
    let placeholders = vec!["?"; entries.len()].join(", ");
    let sql = format!(
        "EXISTS (SELECT 1 FROM json_each(CASE WHEN json_valid({column}) THEN {column} \
         ELSE '[]' END) AS tag WHERE {} IN ({placeholders}))",
        fold_sql("tag.value"),
    );
    Some(Expr::cust_with_values(sql, entries.iter().map(|e| fold(e))))
}

fn search_condition<C: Catalog>(text: &str) -> Option<Condition> {
    let pattern = format!("%{}%", escape_like(&fold(text)));
    let mut any = Condition::any();
    let mut used = false;
    for field in [
        Field::Title,
        Field::ShortDescription,
        Field::Description,
        Field::Categories,
        Field::Skills,
        Field::Themes,
    ] {
        let Some(column) = C::column(field) else {
            continue;
        };
        any = any.add(
            Expr::expr(Expr::cust(fold_sql(&qualified::<C>(column))))
                .like(LikeExpr::new(pattern.clone()).escape('\\')),
        );
        used = true;
    }
    used.then_some(any)
}

fn escape_like(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn parse_number(name: &str, raw: Option<&str>, policy: ParamPolicy) -> AppResult<Option<i32>> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    match (raw.parse::<i32>(), policy) {
        (Ok(value), _) => Ok(Some(value)),
        (Err(_), ParamPolicy::Lenient) => Ok(None),
        (Err(_), ParamPolicy::Strict) => Err(crate::error::AppError::validation(format!(
            "Ugyldig værdi for parameteren {name}: {raw:?}"
        ))),
    }
}

fn non_blank(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string)
}

fn is_true(raw: Option<&str>) -> bool {
    raw.is_some_and(|v| v.trim() == "true")
}

/// Comma-separated tags, trimmed and case-folded, blanks dropped.
pub fn tag_list(raw: Option<&str>) -> Vec<String> {
    raw.map(|raw| {
        raw.split(',')
            .map(|t| fold(t.trim()))
            .filter(|t| !t.is_empty())
            .collect()
    })
    .unwrap_or_default()
}
