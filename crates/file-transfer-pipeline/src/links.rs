use chunked_blob_store::BlobId;

/// Builds public retrieval URLs of the form `{base}/file/{id}`.
#[derive(Debug, Clone)]
pub struct RetrievalLinks {
    base_url: String,
}

impl RetrievalLinks {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url }
    }

    pub fn file_url(&self, id: &BlobId) -> String {
        format!("{}/file/{}", self.base_url, id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_not_doubled() {
        let id: BlobId = "01ARZ3NDEKTSV4RRFFQ69G5FAV".parse().unwrap();
        let links = RetrievalLinks::new("https://files.example.com/");
        assert_eq!(
            links.file_url(&id),
            "https://files.example.com/file/01ARZ3NDEKTSV4RRFFQ69G5FAV"
        );
    }
}
