use sea_orm::{Order, QueryOrder, Select};

use super::{Catalog, Field};

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum SortKey {
    #[default]
    Rating,
    Title,
    MinAge,
    Price,
    PlayTimeMinutes,
    CreatedAt,
}

impl SortKey {
    /// Whitelisted keys only; anything else sorts by rating.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("title") => SortKey::Title,
            Some("minAge") => SortKey::MinAge,
            Some("price") => SortKey::Price,
            Some("playTimeMinutes") => SortKey::PlayTimeMinutes,
            Some("createdAt") => SortKey::CreatedAt,
            _ => SortKey::Rating,
        }
    }

    fn field(self) -> Field {
        match self {
            SortKey::Rating => Field::Rating,
            SortKey::Title => Field::Title,
            SortKey::MinAge => Field::MinAge,
            SortKey::Price => Field::Price,
            SortKey::PlayTimeMinutes => Field::PlayTimeMinutes,
            SortKey::CreatedAt => Field::CreatedAt,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Direction {
    Asc,
    #[default]
    Desc,
}

impl Direction {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("asc") => Direction::Asc,
            _ => Direction::Desc,
        }
    }

    fn order(self) -> Order {
        match self {
            Direction::Asc => Order::Asc,
            Direction::Desc => Order::Desc,
        }
    }
}

/// Requested sort key, always applied behind the editor's-choice and featured
/// tiers and ahead of the `id` tie-break.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Ordering {
    pub key: SortKey,
    pub direction: Direction,
}

impl Ordering {
    pub fn resolve(sort: Option<&str>, order: Option<&str>) -> Self {
        Self { key: SortKey::parse(sort), direction: Direction::parse(order) }
    }

    pub fn apply<C: Catalog>(self, mut select: Select<C>) -> Select<C> {
        for tier in [Field::EditorChoice, Field::Featured] {
            if let Some(column) = C::column(tier) {
                select = select.order_by(column, Order::Desc);
            }
        }

        let column = C::column(self.key.field()).or_else(|| C::column(Field::Rating));
        if let Some(column) = column {
            select = select.order_by(column, self.direction.order());
        }

        tie_break::<C>(select)
    }
}

/// Search results rank featured entities first, then by rating.
pub fn apply_search_order<C: Catalog>(mut select: Select<C>) -> Select<C> {
    for field in [Field::Featured, Field::Rating] {
        if let Some(column) = C::column(field) {
            select = select.order_by(column, Order::Desc);
        }
    }
    tie_break::<C>(select)
}

fn tie_break<C: Catalog>(select: Select<C>) -> Select<C> {
    match C::column(Field::Id) {
        Some(id) => select.order_by(id, Order::Asc),
        None => select,
    }
}
