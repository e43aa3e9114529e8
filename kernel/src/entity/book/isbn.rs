use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BookIsbn {
    /*
     * Unassigned means that the store has not issued an identity yet
     */
    Unassigned,
    /*
     * Assigned holds the identity issued by the store, always positive
     */
    Assigned(i32),
}

impl BookIsbn {
    pub fn new(isbn: impl Into<i32>) -> Self {
        let isbn = isbn.into();
        if isbn <= 0 {
            Self::Unassigned
        } else {
            Self::Assigned(isbn)
        }
    }

    pub fn is_assigned(&self) -> bool {
        matches!(self, Self::Assigned(_))
    }
}

impl From<i32> for BookIsbn {
    fn from(isbn: i32) -> Self {
        Self::new(isbn)
    }
}

impl From<BookIsbn> for i32 {
    fn from(isbn: BookIsbn) -> Self {
        *isbn.as_ref()
    }
}

impl AsRef<i32> for BookIsbn {
    fn as_ref(&self) -> &i32 {
        match self {
            Self::Unassigned => &0,
            Self::Assigned(isbn) => isbn,
        }
    }
}

impl Serialize for BookIsbn {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.as_ref().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for BookIsbn {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        i32::deserialize(deserializer).map(Self::new)
    }
}

#[cfg(test)]
mod test {
    use super::BookIsbn;

    #[test]
    fn non_positive_is_unassigned() {
        assert_eq!(BookIsbn::new(0), BookIsbn::Unassigned);
        assert_eq!(BookIsbn::new(-4), BookIsbn::Unassigned);
        assert_eq!(BookIsbn::new(12), BookIsbn::Assigned(12));
        assert_eq!(i32::from(BookIsbn::Unassigned), 0);
    }
}
