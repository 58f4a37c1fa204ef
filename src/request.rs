//! Per-service request shapes
//!
//! The five providers accept the same kind of request: one multipart POST
//! carrying the image, authenticated by a single header. They differ only in
//! the header name, the auth scheme, the form field that carries the file and
//! a few fixed text fields. All of that lives in [`REQUEST_SHAPES`]; adding a
//! provider is a table change.

use crate::registry::ServiceConfig;
use crate::service::ServiceId;
use crate::types::ImagePayload;

/// How the credential is placed into the auth header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthScheme {
    /// Header value is the key itself
    RawKey,
    /// Header value is `Bearer <key>`
    Bearer,
}

impl AuthScheme {
    /// Header value for `credential`
    #[must_use]
    pub fn header_value(self, credential: &str) -> String {
        match self {
            Self::RawKey => credential.to_string(),
            Self::Bearer => format!("Bearer {credential}"),
        }
    }
}

/// Request layout for one service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestShape {
    pub service: ServiceId,
    pub auth_header: &'static str,
    pub auth_scheme: AuthScheme,
    /// Multipart field carrying the image file
    pub file_field: &'static str,
    /// Fixed text fields sent alongside the file
    pub extra_fields: &'static [(&'static str, &'static str)],
}

/// Request layouts, indexed by [`ServiceId::index`]
pub static REQUEST_SHAPES: [RequestShape; ServiceId::COUNT] = [
    RequestShape {
        service: ServiceId::RemoveBg,
        auth_header: "X-Api-Key",
        auth_scheme: AuthScheme::RawKey,
        file_field: "image_file",
        extra_fields: &[("size", "auto")],
    },
    RequestShape {
        service: ServiceId::PhotoRoom,
        auth_header: "x-api-key",
        auth_scheme: AuthScheme::RawKey,
        file_field: "image_file",
        extra_fields: &[],
    },
    RequestShape {
        service: ServiceId::WithoutBg,
        auth_header: "Authorization",
        auth_scheme: AuthScheme::Bearer,
        file_field: "image",
        extra_fields: &[("model", "focus")],
    },
    RequestShape {
        service: ServiceId::Pixian,
        auth_header: "Authorization",
        auth_scheme: AuthScheme::Bearer,
        file_field: "image",
        extra_fields: &[],
    },
    RequestShape {
        service: ServiceId::RemoveBgApi,
        auth_header: "Authorization",
        auth_scheme: AuthScheme::Bearer,
        file_field: "image",
        extra_fields: &[],
    },
];

impl RequestShape {
    /// Layout for `service`
    #[must_use]
    pub fn for_service(service: ServiceId) -> &'static RequestShape {
        &REQUEST_SHAPES[service.index()]
    }
}

/// Image part of a prepared request; borrows the caller's payload
#[derive(Debug, Clone, Copy)]
pub struct FilePart<'a> {
    pub field: &'static str,
    pub file_name: &'a str,
    pub mime_type: &'a str,
    pub data: &'a [u8],
}

/// Transport-independent description of one outgoing POST
#[derive(Clone)]
pub struct PreparedRequest<'a> {
    pub service: ServiceId,
    pub endpoint: &'a str,
    pub auth_header: &'static str,
    pub auth_value: String,
    pub fields: &'static [(&'static str, &'static str)],
    pub file: FilePart<'a>,
}

impl<'a> PreparedRequest<'a> {
    /// Lay out a request for `config`'s service around `payload`
    #[must_use]
    pub fn build(config: &'a ServiceConfig, payload: &'a ImagePayload) -> Self {
        let shape = RequestShape::for_service(config.service);
        Self {
            service: config.service,
            endpoint: &config.endpoint,
            auth_header: shape.auth_header,
            auth_value: shape.auth_scheme.header_value(&config.credential),
            fields: shape.extra_fields,
            file: FilePart {
                field: shape.file_field,
                file_name: payload.file_name(),
                mime_type: payload.mime_type(),
                data: payload.data(),
            },
        }
    }
}

impl std::fmt::Debug for PreparedRequest<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreparedRequest")
            .field("service", &self.service)
            .field("endpoint", &self.endpoint)
            .field("auth_header", &self.auth_header)
            .field("auth_value", &"<redacted>")
            .field("fields", &self.fields)
            .field("file_field", &self.file.field)
            .field("file_name", &self.file.file_name)
            .field("mime_type", &self.file.mime_type)
            .field("len", &self.file.data.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ServiceRegistry;

    #[test]
    fn test_shapes_are_indexed_by_service() {
        for id in ServiceId::ALL {
            assert_eq!(RequestShape::for_service(id).service, id);
        }
    }

    #[test]
    fn test_shape_table_matches_each_provider() {
        // (service, header, scheme, file field, rendered header value for "k")
        let expected = [
            (ServiceId::RemoveBg, "X-Api-Key", AuthScheme::RawKey, "image_file", "k"),
            (ServiceId::PhotoRoom, "x-api-key", AuthScheme::RawKey, "image_file", "k"),
            (ServiceId::WithoutBg, "Authorization", AuthScheme::Bearer, "image", "Bearer k"),
            (ServiceId::Pixian, "Authorization", AuthScheme::Bearer, "image", "Bearer k"),
            (ServiceId::RemoveBgApi, "Authorization", AuthScheme::Bearer, "image", "Bearer k"),
        ];

        for (id, header, scheme, field, value) in expected {
            let shape = RequestShape::for_service(id);
            assert_eq!(shape.auth_header, header, "{id}");
            assert_eq!(shape.auth_scheme, scheme, "{id}");
            assert_eq!(shape.file_field, field, "{id}");
            assert_eq!(shape.auth_scheme.header_value("k"), value, "{id}");
        }
    }

    #[test]
    fn test_extra_fields() {
        assert_eq!(
            RequestShape::for_service(ServiceId::WithoutBg).extra_fields,
            &[("model", "focus")]
        );
        assert_eq!(
            RequestShape::for_service(ServiceId::RemoveBg).extra_fields,
            &[("size", "auto")]
        );
        for id in [ServiceId::PhotoRoom, ServiceId::Pixian, ServiceId::RemoveBgApi] {
            assert!(RequestShape::for_service(id).extra_fields.is_empty());
        }
    }

    #[test]
    fn test_build_borrows_payload_and_config() {
        let registry = ServiceRegistry::with_credentials([(ServiceId::Pixian, "px")]);
        let payload = ImagePayload::new(vec![7; 10], "image/jpeg").with_file_name("cat.jpg");
        let request = PreparedRequest::build(registry.get_config(ServiceId::Pixian), &payload);

        assert_eq!(request.service, ServiceId::Pixian);
        assert_eq!(request.endpoint, "https://api.pixian.ai/api/v2/remove-background");
        assert_eq!(request.auth_header, "Authorization");
        assert_eq!(request.auth_value, "Bearer px");
        assert_eq!(request.file.field, "image");
        assert_eq!(request.file.file_name, "cat.jpg");
        assert_eq!(request.file.mime_type, "image/jpeg");
        assert_eq!(request.file.data.len(), 10);
        assert!(std::ptr::eq(request.file.data.as_ptr(), payload.data().as_ptr()));
    }

    #[test]
    fn test_debug_redacts_credential() {
        let registry = ServiceRegistry::with_credentials([(ServiceId::RemoveBg, "top-secret")]);
        let payload = ImagePayload::new(vec![1], "image/png");
        let request = PreparedRequest::build(registry.get_config(ServiceId::RemoveBg), &payload);
        assert!(!format!("{request:?}").contains("top-secret"));
    }
}
