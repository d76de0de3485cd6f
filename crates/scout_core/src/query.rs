use std::fmt;

/// Upper bound on companies per search unless configured otherwise.
pub const DEFAULT_MAX_COMPANIES: usize = 50;

/// A validated search query: trimmed, non-empty company names in input order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompanyQuery {
    companies: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryError {
    Empty,
    TooMany { max: usize, actual: usize },
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryError::Empty => write!(f, "Please enter at least one company name"),
            QueryError::TooMany { max, .. } => {
                write!(f, "Please enter no more than {max} companies at once")
            }
        }
    }
}

impl CompanyQuery {
    /// Split newline-delimited input into company names.
    ///
    /// Lines are trimmed and blank lines dropped. Duplicates are kept. `max`
    /// of `None` means no count limit.
    pub fn parse(raw: &str, max: Option<usize>) -> Result<Self, QueryError> {
        let companies: Vec<String> = raw
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(ToOwned::to_owned)
            .collect();

        if companies.is_empty() {
            return Err(QueryError::Empty);
        }
        if let Some(max) = max {
            if companies.len() > max {
                return Err(QueryError::TooMany {
                    max,
                    actual: companies.len(),
                });
            }
        }
        Ok(Self { companies })
    }

    pub fn companies(&self) -> &[String] {
        &self.companies
    }

    pub fn len(&self) -> usize {
        self.companies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.companies.is_empty()
    }

    pub fn into_companies(self) -> Vec<String> {
        self.companies
    }
}
