//! Boolean predicate model over the dataset entity graph.
//!
//! Predicates are plain values: builders compose them, storage backends
//! translate or evaluate them. Evaluation here works on [`Row`] views so an
//! in-memory backend can answer queries without knowing how a predicate was
//! built.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use obs_common::{Dimension, Envelope, EntityId, Geometry, TimeInterval};

/// Which key of an entity a filter compares against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// Surrogate numeric id.
    Id,
    /// Domain identifier string.
    Identifier,
}

impl Key {
    pub fn for_domain_ids(use_domain_identifiers: bool) -> Self {
        if use_domain_identifiers {
            Key::Identifier
        } else {
            Key::Id
        }
    }

    fn column_name(&self) -> &'static str {
        match self {
            Key::Id => "id",
            Key::Identifier => "identifier",
        }
    }
}

/// A column addressable on a row.
///
/// Rows answer only the columns that exist for their entity type; every
/// other column reads as NULL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    /// Key of the row's own entity.
    Own(Key),
    /// Key of an entity the row references (dataset rows).
    Ref(Dimension, Key),
    /// Geometry of the row: a feature's own, or a dataset's feature geometry.
    Geometry,
    Published,
    Deleted,
    Disabled,
    ValueKind,
    DatasetKind,
    SamplingTimeEnd,
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Column::Own(key) => f.write_str(key.column_name()),
            Column::Ref(dim, key) => write!(f, "{}.{}", dim.name(), key.column_name()),
            Column::Geometry => f.write_str("geometry"),
            Column::Published => f.write_str("published"),
            Column::Deleted => f.write_str("deleted"),
            Column::Disabled => f.write_str("disabled"),
            Column::ValueKind => f.write_str("value_type"),
            Column::DatasetKind => f.write_str("dataset_type"),
            Column::SamplingTimeEnd => f.write_str("sampling_time_end"),
        }
    }
}

/// Value read from a row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cell<'a> {
    Null,
    Int(i64),
    Text(&'a str),
    Bool(bool),
    Time(DateTime<Utc>),
    Geometry(&'a Geometry),
}

impl Cell<'_> {
    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }
}

impl<'a> From<Option<EntityId>> for Cell<'a> {
    fn from(value: Option<EntityId>) -> Self {
        value.map(Cell::Int).unwrap_or(Cell::Null)
    }
}

impl<'a> From<Option<DateTime<Utc>>> for Cell<'a> {
    fn from(value: Option<DateTime<Utc>>) -> Self {
        value.map(Cell::Time).unwrap_or(Cell::Null)
    }
}

/// A row view a predicate can be evaluated against.
pub trait Row {
    fn cell(&self, column: Column) -> Cell<'_>;
}

/// Literal set for membership tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueSet {
    Ids(BTreeSet<EntityId>),
    Texts(BTreeSet<String>),
}

impl ValueSet {
    pub fn is_empty(&self) -> bool {
        match self {
            ValueSet::Ids(ids) => ids.is_empty(),
            ValueSet::Texts(texts) => texts.is_empty(),
        }
    }

    fn contains(&self, cell: &Cell<'_>) -> bool {
        match (self, cell) {
            (ValueSet::Ids(ids), Cell::Int(v)) => ids.contains(v),
            (ValueSet::Texts(texts), Cell::Text(v)) => texts.contains(*v),
            _ => false,
        }
    }
}

impl fmt::Display for ValueSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let items: Vec<String> = match self {
            ValueSet::Ids(ids) => ids.iter().map(|id| id.to_string()).collect(),
            ValueSet::Texts(texts) => texts
                .iter()
                .map(|t| format!("'{}'", t.replace('\'', "''")))
                .collect(),
        };
        write!(f, "({})", items.join(", "))
    }
}

/// Dataset rows matching `filter`, projected onto one dimension's foreign key.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetSubquery {
    pub projection: Dimension,
    pub filter: Box<Predicate>,
}

/// Answers dataset subqueries during evaluation.
pub trait SubqueryResolver {
    fn project(&self, subquery: &DatasetSubquery) -> BTreeSet<EntityId>;
}

/// Resolver for contexts where no subquery can occur.
pub struct NoSubqueries;

impl SubqueryResolver for NoSubqueries {
    fn project(&self, _subquery: &DatasetSubquery) -> BTreeSet<EntityId> {
        BTreeSet::new()
    }
}

/// A composable boolean condition.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// No restriction.
    Always,
    /// Matches nothing.
    Never,
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
    Not(Box<Predicate>),
    IsNotNull(Column),
    Flag { column: Column, value: bool },
    In { column: Column, values: ValueSet },
    Intersects { column: Column, envelope: Envelope },
    Within { column: Column, interval: TimeInterval },
    InSubquery { column: Column, subquery: DatasetSubquery },
}

impl Predicate {
    /// Conjunction; `Always` is the identity and `Never` absorbs.
    pub fn and<I>(predicates: I) -> Predicate
    where
        I: IntoIterator<Item = Predicate>,
    {
        let mut parts = Vec::new();
        for predicate in predicates {
            match predicate {
                Predicate::Always => {}
                Predicate::Never => return Predicate::Never,
                Predicate::And(inner) => parts.extend(inner),
                other => parts.push(other),
            }
        }
        match parts.len() {
            0 => Predicate::Always,
            1 => parts.remove(0),
            _ => Predicate::And(parts),
        }
    }

    /// Disjunction; `Never` is the identity and `Always` absorbs.
    pub fn or<I>(predicates: I) -> Predicate
    where
        I: IntoIterator<Item = Predicate>,
    {
        let mut parts = Vec::new();
        for predicate in predicates {
            match predicate {
                Predicate::Never => {}
                Predicate::Always => return Predicate::Always,
                Predicate::Or(inner) => parts.extend(inner),
                other => parts.push(other),
            }
        }
        match parts.len() {
            0 => Predicate::Never,
            1 => parts.remove(0),
            _ => Predicate::Or(parts),
        }
    }

    pub fn negate(predicate: Predicate) -> Predicate {
        match predicate {
            Predicate::Always => Predicate::Never,
            Predicate::Never => Predicate::Always,
            Predicate::Not(inner) => *inner,
            other => Predicate::Not(Box::new(other)),
        }
    }

    /// Conjunction with optional parts, absent ones omitted.
    pub fn all_of<I>(predicates: I) -> Predicate
    where
        I: IntoIterator<Item = Option<Predicate>>,
    {
        Predicate::and(predicates.into_iter().flatten())
    }

    pub fn is_always(&self) -> bool {
        matches!(self, Predicate::Always)
    }

    /// Evaluate against a row. NULL cells compare false.
    pub fn evaluate(&self, row: &dyn Row, resolver: &dyn SubqueryResolver) -> bool {
        match self {
            Predicate::Always => true,
            Predicate::Never => false,
            Predicate::And(parts) => parts.iter().all(|p| p.evaluate(row, resolver)),
            Predicate::Or(parts) => parts.iter().any(|p| p.evaluate(row, resolver)),
            Predicate::Not(inner) => !inner.evaluate(row, resolver),
            Predicate::IsNotNull(column) => !row.cell(*column).is_null(),
            Predicate::Flag { column, value } => {
                matches!(row.cell(*column), Cell::Bool(b) if b == *value)
            }
            Predicate::In { column, values } => values.contains(&row.cell(*column)),
            Predicate::Intersects { column, envelope } => match row.cell(*column) {
                Cell::Geometry(geometry) => geometry.intersects(envelope),
                _ => false,
            },
            Predicate::Within { column, interval } => match row.cell(*column) {
                Cell::Time(t) => interval.contains(&t),
                _ => false,
            },
            Predicate::InSubquery { column, subquery } => match row.cell(*column) {
                Cell::Int(id) => resolver.project(subquery).contains(&id),
                _ => false,
            },
        }
    }

    /// Replace every subquery with the literal id set it resolves to, so
    /// evaluation over many rows resolves each subquery once.
    pub fn bind_subqueries(&self, resolver: &dyn SubqueryResolver) -> Predicate {
        match self {
            Predicate::And(parts) => {
                Predicate::and(parts.iter().map(|p| p.bind_subqueries(resolver)))
            }
            Predicate::Or(parts) => Predicate::or(parts.iter().map(|p| p.bind_subqueries(resolver))),
            Predicate::Not(inner) => Predicate::negate(inner.bind_subqueries(resolver)),
            Predicate::InSubquery { column, subquery } => {
                let ids = resolver.project(subquery);
                if ids.is_empty() {
                    Predicate::Never
                } else {
                    Predicate::In {
                        column: *column,
                        values: ValueSet::Ids(ids),
                    }
                }
            }
            other => other.clone(),
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Always => f.write_str("TRUE"),
            Predicate::Never => f.write_str("FALSE"),
            Predicate::And(parts) => write_joined(f, parts, " AND "),
            Predicate::Or(parts) => write_joined(f, parts, " OR "),
            Predicate::Not(inner) => write!(f, "NOT ({})", inner),
            Predicate::IsNotNull(column) => write!(f, "{} IS NOT NULL", column),
            Predicate::Flag { column, value } => write!(f, "{} = {}", column, value),
            Predicate::In { column, values } => write!(f, "{} IN {}", column, values),
            Predicate::Intersects { column, envelope } => {
                write!(f, "ST_Intersects({}, ST_MakeEnvelope({}))", column, envelope)
            }
            Predicate::Within { column, interval } => {
                write!(f, "{} WITHIN '{}'", column, interval)
            }
            Predicate::InSubquery { column, subquery } => write!(
                f,
                "{} IN (SELECT {}_id FROM datasets WHERE {})",
                column,
                subquery.projection.name(),
                subquery.filter
            ),
        }
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, parts: &[Predicate], sep: &str) -> fmt::Result {
    f.write_str("(")?;
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            f.write_str(sep)?;
        }
        write!(f, "{}", part)?;
    }
    f.write_str(")")
}
