/// Fixed part of the multipart boundary; the client id is appended
pub(crate) const BOUNDARY_MARKER: &str = "FMDataClientBoundary";

/// File contents for a container field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerUpload {
    pub field_name: String,
    /// 1-based field repetition
    pub repetition: u32,
    pub filename: String,
    pub content_type: String,
    pub content: Vec<u8>,
}

impl ContainerUpload {
    pub fn new(
        field_name: impl Into<String>,
        filename: impl Into<String>,
        content_type: impl Into<String>,
        content: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            field_name: field_name.into(),
            repetition: 1,
            filename: filename.into(),
            content_type: content_type.into(),
            content: content.into(),
        }
    }

    pub fn repetition(mut self, repetition: u32) -> Self {
        self.repetition = repetition;
        self
    }

    /// `multipart/form-data` body with a single `upload` part
    pub(crate) fn form_data(&self, boundary: &str) -> Vec<u8> {
        let filename = self.filename.replace('"', "%22");
        let mut body = Vec::with_capacity(self.content.len() + 256);
        body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"upload\"; filename=\"{}\"\r\n",
                filename
            )
            .as_bytes(),
        );
        body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", self.content_type).as_bytes());
        body.extend_from_slice(&self.content);
        body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());
        body
    }
}

pub(crate) fn boundary(client_id: &str) -> String {
    format!("{}{}", BOUNDARY_MARKER, client_id)
}

pub(crate) fn content_type(boundary: &str) -> String {
    format!("multipart/form-data; boundary={}", boundary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_data_layout() {
        let upload = ContainerUpload::new("photo", "a.txt", "text/plain", "hello");
        let body = String::from_utf8(upload.form_data("B1")).unwrap();
        assert_eq!(
            body,
            "--B1\r\n\
             Content-Disposition: form-data; name=\"upload\"; filename=\"a.txt\"\r\n\
             Content-Type: text/plain\r\n\
             \r\n\
             hello\r\n\
             --B1--\r\n"
        );
    }

    #[test]
    fn test_binary_content_is_untouched() {
        let bytes = vec![0u8, 159, 146, 150, 255];
        let upload = ContainerUpload::new("f", "x.bin", "application/octet-stream", bytes.clone());
        let body = upload.form_data("B");
        assert!(body.windows(bytes.len()).any(|w| w == bytes.as_slice()));
        assert_eq!(upload.repetition, 1);
    }

    #[test]
    fn test_boundary_and_content_type() {
        let b = boundary("abc123");
        assert_eq!(b, "FMDataClientBoundaryabc123");
        assert_eq!(
            content_type(&b),
            "multipart/form-data; boundary=FMDataClientBoundaryabc123"
        );
    }
}
