//! ADQL condition expressions.

use std::{fmt::Display, sync::Arc};

use ehst_core::{Degrees, SkyCoord};
use itertools::Itertools;

/// Archive columns that criteria can filter on.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Column {
    /// `p.calibration_level`
    CalibrationLevel,
    /// `p.data_product_type`
    DataProductType,
    /// `o.intent`
    Intent,
    /// `o.collection`
    Collection,
    /// `o.instrument_name`
    InstrumentName,
    /// `o.instrument_configuration`, which carries the filter names.
    InstrumentConfiguration,
}

impl Column {
    /// Qualified column name as it appears in the query.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CalibrationLevel => "p.calibration_level",
            Self::DataProductType => "p.data_product_type",
            Self::Intent => "o.intent",
            Self::Collection => "o.collection",
            Self::InstrumentName => "o.instrument_name",
            Self::InstrumentConfiguration => "o.instrument_configuration",
        }
    }

    /// Matches when the column contains `value` as a substring.
    pub fn like(self, value: impl Into<String>) -> Expr {
        Expr::new(ExprInner::Comparison(Comparison {
            column: self,
            operator: Operator::Like(value.into()),
        }))
    }

    /// Matches when the column contains any of `values`.
    pub fn like_any<I, S>(self, values: I) -> Expr
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        any(values.into_iter().map(|value| self.like(value)))
    }
}
impl Display for Column {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Condition expression rendered into an ADQL `WHERE` clause.
#[derive(Debug, Clone)]
pub struct Expr(Arc<ExprInner>);

#[derive(Debug, Clone)]
enum ExprInner {
    True,
    Comparison(Comparison),
    Group { kind: GroupKind, clauses: Vec<Expr> },
    Contains(Circle),
}

#[derive(Debug, Clone)]
struct Comparison {
    column: Column,
    operator: Operator,
}

#[derive(Debug, Clone)]
enum Operator {
    Like(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GroupKind {
    And,
    Or,
}

#[derive(Debug, Clone, Copy)]
struct Circle {
    ra: Degrees,
    dec: Degrees,
    radius: Degrees,
}

impl Expr {
    fn new(inner: ExprInner) -> Self {
        Self(Arc::new(inner))
    }

    /// Renders the expression as ADQL.
    ///
    /// Groups always carry their parentheses, even with a single clause.
    pub fn to_adql(&self) -> String {
        match self.0.as_ref() {
            ExprInner::True => "1=1".to_string(),
            ExprInner::Comparison(cmp) => cmp.to_adql(),
            ExprInner::Group { kind, clauses } => {
                let joiner = match kind {
                    GroupKind::And => " AND ",
                    GroupKind::Or => " OR ",
                };
                format!("({})", clauses.iter().map(Expr::to_adql).join(joiner))
            }
            ExprInner::Contains(circle) => format!(
                "1=CONTAINS(POINT('ICRS', pos.ra, pos.dec),CIRCLE('ICRS', {}, {}, {}))",
                circle.ra, circle.dec, circle.radius
            ),
        }
    }

    /// Columns referenced by the expression, in rendering order.
    pub fn referenced_columns(&self, out: &mut Vec<Column>) {
        match self.0.as_ref() {
            ExprInner::True | ExprInner::Contains(_) => {}
            ExprInner::Comparison(cmp) => out.push(cmp.column),
            ExprInner::Group { clauses, .. } => {
                for clause in clauses {
                    clause.referenced_columns(out);
                }
            }
        }
    }
}

impl Comparison {
    fn to_adql(&self) -> String {
        match &self.operator {
            Operator::Like(value) => format!("{} LIKE '%{}%'", self.column, escape_literal(value)),
        }
    }
}

pub(crate) fn escape_literal(value: &str) -> String {
    value.replace('\'', "''")
}

/// Combines the supplied expressions with logical AND semantics.
pub fn all<I>(iter: I) -> Expr
where
    I: IntoIterator<Item = Expr>,
{
    group(GroupKind::And, iter)
}

/// Combines the supplied expressions with logical OR semantics.
pub fn any<I>(iter: I) -> Expr
where
    I: IntoIterator<Item = Expr>,
{
    group(GroupKind::Or, iter)
}

fn group<I>(kind: GroupKind, iter: I) -> Expr
where
    I: IntoIterator<Item = Expr>,
{
    let clauses: Vec<Expr> = iter.into_iter().collect();
    if clauses.is_empty() {
        Expr::new(ExprInner::True)
    } else {
        Expr::new(ExprInner::Group { kind, clauses })
    }
}

/// Matches positions inside the circle of `radius` degrees around `center`.
pub fn within_circle(center: &SkyCoord, radius: Degrees) -> Expr {
    Expr::new(ExprInner::Contains(Circle {
        ra: center.ra(),
        dec: center.dec(),
        radius,
    }))
}
