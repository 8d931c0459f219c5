//! Transaction documents attributed to an entity

/// Role of the entity within a transaction document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentRole {
    /// The entity issued the document (seller)
    Emisor,

    /// The entity received the document (buyer)
    Receptor,
}

impl DocumentRole {
    /// Get the role name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentRole::Emisor => "emisor",
            DocumentRole::Receptor => "receptor",
        }
    }
}

/// A flattened text record describing one transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Raw flattened text (`Key:value` tokens separated by spaces)
    pub text: String,

    /// Role of the owning entity in this transaction
    pub role: DocumentRole,
}

impl Document {
    /// Create an issuer-side document
    pub fn emisor(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            role: DocumentRole::Emisor,
        }
    }

    /// Create a recipient-side document
    pub fn receptor(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            role: DocumentRole::Receptor,
        }
    }
}

/// All documents of one entity, split by role
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityDocuments {
    /// Documents where the entity is the issuer
    pub emisor: Vec<Document>,

    /// Documents where the entity is the recipient
    pub receptor: Vec<Document>,
}

impl EntityDocuments {
    /// Add a document to the list matching its role
    pub fn push(&mut self, document: Document) {
        match document.role {
            DocumentRole::Emisor => self.emisor.push(document),
            DocumentRole::Receptor => self.receptor.push(document),
        }
    }

    /// Total number of documents across both roles
    pub fn len(&self) -> usize {
        self.emisor.len() + self.receptor.len()
    }

    /// Whether the entity has no documents at all
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_routes_by_role() {
        let mut docs = EntityDocuments::default();
        docs.push(Document::emisor("a"));
        docs.push(Document::receptor("b"));
        docs.push(Document::emisor("c"));

        assert_eq!(docs.emisor.len(), 2);
        assert_eq!(docs.receptor.len(), 1);
        assert_eq!(docs.len(), 3);
        assert!(!docs.is_empty());
    }
}
