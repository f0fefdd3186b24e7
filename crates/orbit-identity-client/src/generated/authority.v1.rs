// @generated
// This file is @generated by prost-build.
/// Lookup / filter request against the authority's user set.
///
/// `service_name` and `sub_service_name` attribute every request to the
/// calling service. All other fields are optional criteria; an empty query
/// matches every user.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct UserQuery {
    #[prost(string, tag = "1")]
    pub service_name: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub sub_service_name: ::prost::alloc::string::String,
    #[prost(int64, optional, tag = "3")]
    pub id: ::core::option::Option<i64>,
    #[prost(string, optional, tag = "4")]
    pub national_id: ::core::option::Option<::prost::alloc::string::String>,
    #[prost(string, optional, tag = "5")]
    pub username: ::core::option::Option<::prost::alloc::string::String>,
    #[prost(string, optional, tag = "6")]
    pub email: ::core::option::Option<::prost::alloc::string::String>,
    #[prost(string, optional, tag = "7")]
    pub phone: ::core::option::Option<::prost::alloc::string::String>,
    #[prost(string, optional, tag = "8")]
    pub role: ::core::option::Option<::prost::alloc::string::String>,
    #[prost(string, optional, tag = "9")]
    pub department: ::core::option::Option<::prost::alloc::string::String>,
}
/// Canonical identity record for one user, produced only by the authority.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct UserRecord {
    #[prost(int64, tag = "1")]
    pub id: i64,
    #[prost(string, tag = "2")]
    pub national_id: ::prost::alloc::string::String,
    #[prost(string, tag = "3")]
    pub phone: ::prost::alloc::string::String,
    #[prost(string, tag = "4")]
    pub email: ::prost::alloc::string::String,
    #[prost(string, tag = "5")]
    pub first_name: ::prost::alloc::string::String,
    #[prost(string, tag = "6")]
    pub last_name: ::prost::alloc::string::String,
    #[prost(string, tag = "7")]
    pub username: ::prost::alloc::string::String,
    #[prost(string, tag = "8")]
    pub service: ::prost::alloc::string::String,
    #[prost(string, repeated, tag = "9")]
    pub sub_services: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
    #[prost(string, repeated, tag = "10")]
    pub roles: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
    #[prost(string, repeated, tag = "11")]
    pub departments: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
    #[prost(string, tag = "12")]
    pub image: ::prost::alloc::string::String,
    #[prost(bool, tag = "13")]
    pub is_verified: bool,
    #[prost(bool, tag = "14")]
    pub is_staff: bool,
    #[prost(bool, tag = "15")]
    pub is_superuser: bool,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct UserIdList {
    #[prost(int64, repeated, tag = "1")]
    pub ids: ::prost::alloc::vec::Vec<i64>,
}
/// Ids matching a filter, keyed by criterion name (e.g. `user_id`).
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct FilterUserResponse {
    #[prost(map = "string, message", tag = "1")]
    pub matches: ::std::collections::HashMap<
        ::prost::alloc::string::String,
        UserIdList,
    >,
}
/// Pre-serialized variant of the filter result.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct FilterUserSerializedResponse {
    /// JSON document produced by the authority's own serializer.
    #[prost(string, tag = "1")]
    pub payload: ::prost::alloc::string::String,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct VerifyLoginRequest {
    #[prost(string, tag = "1")]
    pub service_name: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub sub_service_name: ::prost::alloc::string::String,
    #[prost(string, tag = "3")]
    pub token: ::prost::alloc::string::String,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct VerifyLoginResponse {
    #[prost(int64, tag = "1")]
    pub user_id: i64,
}
/// Wrapper for repeated fields whose absence must be distinguishable from
/// emptiness in create/update requests.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct StringList {
    #[prost(string, repeated, tag = "1")]
    pub values: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
}
/// Create request. Unset fields are not written by the authority.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CreateUserRequest {
    #[prost(string, tag = "1")]
    pub service_name: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub sub_service_name: ::prost::alloc::string::String,
    #[prost(string, optional, tag = "3")]
    pub national_id: ::core::option::Option<::prost::alloc::string::String>,
    #[prost(string, optional, tag = "4")]
    pub phone: ::core::option::Option<::prost::alloc::string::String>,
    #[prost(string, optional, tag = "5")]
    pub email: ::core::option::Option<::prost::alloc::string::String>,
    #[prost(string, optional, tag = "6")]
    pub first_name: ::core::option::Option<::prost::alloc::string::String>,
    #[prost(string, optional, tag = "7")]
    pub last_name: ::core::option::Option<::prost::alloc::string::String>,
    #[prost(string, optional, tag = "8")]
    pub username: ::core::option::Option<::prost::alloc::string::String>,
    #[prost(string, optional, tag = "9")]
    pub image: ::core::option::Option<::prost::alloc::string::String>,
    #[prost(bool, optional, tag = "10")]
    pub is_verified: ::core::option::Option<bool>,
    #[prost(message, optional, tag = "11")]
    pub sub_services: ::core::option::Option<StringList>,
    #[prost(message, optional, tag = "12")]
    pub roles: ::core::option::Option<StringList>,
    #[prost(message, optional, tag = "13")]
    pub departments: ::core::option::Option<StringList>,
}
/// Update request. Unset fields mean "no change", never "set to empty".
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct UpdateUserRequest {
    #[prost(string, tag = "1")]
    pub service_name: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub sub_service_name: ::prost::alloc::string::String,
    #[prost(int64, tag = "3")]
    pub id: i64,
    #[prost(string, optional, tag = "4")]
    pub national_id: ::core::option::Option<::prost::alloc::string::String>,
    #[prost(string, optional, tag = "5")]
    pub phone: ::core::option::Option<::prost::alloc::string::String>,
    #[prost(string, optional, tag = "6")]
    pub email: ::core::option::Option<::prost::alloc::string::String>,
    #[prost(string, optional, tag = "7")]
    pub first_name: ::core::option::Option<::prost::alloc::string::String>,
    #[prost(string, optional, tag = "8")]
    pub last_name: ::core::option::Option<::prost::alloc::string::String>,
    #[prost(string, optional, tag = "9")]
    pub username: ::core::option::Option<::prost::alloc::string::String>,
    #[prost(string, optional, tag = "10")]
    pub image: ::core::option::Option<::prost::alloc::string::String>,
    #[prost(bool, optional, tag = "11")]
    pub is_verified: ::core::option::Option<bool>,
    #[prost(message, optional, tag = "12")]
    pub sub_services: ::core::option::Option<StringList>,
    #[prost(message, optional, tag = "13")]
    pub roles: ::core::option::Option<StringList>,
    #[prost(message, optional, tag = "14")]
    pub departments: ::core::option::Option<StringList>,
}
/// Request for the authority's canonical vocabularies.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct VocabularyRequest {
    #[prost(string, tag = "1")]
    pub service_name: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub sub_service_name: ::prost::alloc::string::String,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RoleList {
    #[prost(string, repeated, tag = "1")]
    pub roles: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DepartmentList {
    #[prost(string, repeated, tag = "1")]
    pub departments: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
}
/// Generated client implementations.
pub mod authority_service_client {
    #![allow(
        unused_variables,
        dead_code,
        missing_docs,
        clippy::wildcard_imports,
        clippy::let_unit_value,
    )]
    use tonic::codegen::*;
    use tonic::codegen::http::Uri;
    #[derive(Debug, Clone)]
    pub struct AuthorityServiceClient<T> {
        inner: tonic::client::Grpc<T>,
    }
    impl AuthorityServiceClient<tonic::transport::Channel> {
        /// Attempt to create a new client by connecting to a given endpoint.
        pub async fn connect<D>(dst: D) -> Result<Self, tonic::transport::Error>
        where
            D: TryInto<tonic::transport::Endpoint>,
            D::Error: Into<StdError>,
        {
            let conn = tonic::transport::Endpoint::new(dst)?.connect().await?;
            Ok(Self::new(conn))
        }
    }
    impl<T> AuthorityServiceClient<T>
    where
        T: tonic::client::GrpcService<tonic::body::Body>,
        T::Error: Into<StdError>,
        T::ResponseBody: Body<Data = Bytes> + std::marker::Send + 'static,
        <T::ResponseBody as Body>::Error: Into<StdError> + std::marker::Send,
    {
        pub fn new(inner: T) -> Self {
            let inner = tonic::client::Grpc::new(inner);
            Self { inner }
        }
        pub fn with_origin(inner: T, origin: Uri) -> Self {
            let inner = tonic::client::Grpc::with_origin(inner, origin);
            Self { inner }
        }
        pub fn with_interceptor<F>(
            inner: T,
            interceptor: F,
        ) -> AuthorityServiceClient<InterceptedService<T, F>>
        where
            F: tonic::service::Interceptor,
            T::ResponseBody: Default,
            T: tonic::codegen::Service<
                http::Request<tonic::body::Body>,
                Response = http::Response<
                    <T as tonic::client::GrpcService<tonic::body::Body>>::ResponseBody,
                >,
            >,
            <T as tonic::codegen::Service<
                http::Request<tonic::body::Body>,
            >>::Error: Into<StdError> + std::marker::Send + std::marker::Sync,
        {
            AuthorityServiceClient::new(InterceptedService::new(inner, interceptor))
        }
        /// Compress requests with the given encoding.
        ///
        /// This requires the server to support it otherwise it might respond with an
        /// error.
        #[must_use]
        pub fn send_compressed(mut self, encoding: CompressionEncoding) -> Self {
            self.inner = self.inner.send_compressed(encoding);
            self
        }
        /// Enable decompressing responses.
        #[must_use]
        pub fn accept_compressed(mut self, encoding: CompressionEncoding) -> Self {
            self.inner = self.inner.accept_compressed(encoding);
            self
        }
        /// Limits the maximum size of a decoded message.
        ///
        /// Default: `4MB`
        #[must_use]
        pub fn max_decoding_message_size(mut self, limit: usize) -> Self {
            self.inner = self.inner.max_decoding_message_size(limit);
            self
        }
        /// Limits the maximum size of an encoded message.
        ///
        /// Default: `usize::MAX`
        #[must_use]
        pub fn max_encoding_message_size(mut self, limit: usize) -> Self {
            self.inner = self.inner.max_encoding_message_size(limit);
            self
        }
        pub async fn get_user_data(
            &mut self,
            request: impl tonic::IntoRequest<super::UserQuery>,
        ) -> std::result::Result<tonic::Response<super::UserRecord>, tonic::Status> {
            self.inner
                .ready()
                .await
                .map_err(|e| {
                    tonic::Status::unknown(
                        format!("Service was not ready: {}", e.into()),
                    )
                })?;
            let codec = tonic_prost::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static(
                "/authority.v1.AuthorityService/GetUserData",
            );
            let mut req = request.into_request();
            req.extensions_mut()
                .insert(GrpcMethod::new("authority.v1.AuthorityService", "GetUserData"));
            self.inner.unary(req, path, codec).await
        }
        pub async fn filter_user(
            &mut self,
            request: impl tonic::IntoRequest<super::UserQuery>,
        ) -> std::result::Result<
            tonic::Response<super::FilterUserResponse>,
            tonic::Status,
        > {
            self.inner
                .ready()
                .await
                .map_err(|e| {
                    tonic::Status::unknown(
                        format!("Service was not ready: {}", e.into()),
                    )
                })?;
            let codec = tonic_prost::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static(
                "/authority.v1.AuthorityService/FilterUser",
            );
            let mut req = request.into_request();
            req.extensions_mut()
                .insert(GrpcMethod::new("authority.v1.AuthorityService", "FilterUser"));
            self.inner.unary(req, path, codec).await
        }
        pub async fn filter_user_serialized(
            &mut self,
            request: impl tonic::IntoRequest<super::UserQuery>,
        ) -> std::result::Result<
            tonic::Response<super::FilterUserSerializedResponse>,
            tonic::Status,
        > {
            self.inner
                .ready()
                .await
                .map_err(|e| {
                    tonic::Status::unknown(
                        format!("Service was not ready: {}", e.into()),
                    )
                })?;
            let codec = tonic_prost::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static(
                "/authority.v1.AuthorityService/FilterUserSerialized",
            );
            let mut req = request.into_request();
            req.extensions_mut()
                .insert(
                    GrpcMethod::new(
                        "authority.v1.AuthorityService",
                        "FilterUserSerialized",
                    ),
                );
            self.inner.unary(req, path, codec).await
        }
        pub async fn verify_login(
            &mut self,
            request: impl tonic::IntoRequest<super::VerifyLoginRequest>,
        ) -> std::result::Result<
            tonic::Response<super::VerifyLoginResponse>,
            tonic::Status,
        > {
            self.inner
                .ready()
                .await
                .map_err(|e| {
                    tonic::Status::unknown(
                        format!("Service was not ready: {}", e.into()),
                    )
                })?;
            let codec = tonic_prost::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static(
                "/authority.v1.AuthorityService/VerifyLogin",
            );
            let mut req = request.into_request();
            req.extensions_mut()
                .insert(GrpcMethod::new("authority.v1.AuthorityService", "VerifyLogin"));
            self.inner.unary(req, path, codec).await
        }
        pub async fn create_user(
            &mut self,
            request: impl tonic::IntoRequest<super::CreateUserRequest>,
        ) -> std::result::Result<tonic::Response<super::UserRecord>, tonic::Status> {
            self.inner
                .ready()
                .await
                .map_err(|e| {
                    tonic::Status::unknown(
                        format!("Service was not ready: {}", e.into()),
                    )
                })?;
            let codec = tonic_prost::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static(
                "/authority.v1.AuthorityService/CreateUser",
            );
            let mut req = request.into_request();
            req.extensions_mut()
                .insert(GrpcMethod::new("authority.v1.AuthorityService", "CreateUser"));
            self.inner.unary(req, path, codec).await
        }
        pub async fn update_user(
            &mut self,
            request: impl tonic::IntoRequest<super::UpdateUserRequest>,
        ) -> std::result::Result<tonic::Response<super::UserRecord>, tonic::Status> {
            self.inner
                .ready()
                .await
                .map_err(|e| {
                    tonic::Status::unknown(
                        format!("Service was not ready: {}", e.into()),
                    )
                })?;
            let codec = tonic_prost::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static(
                "/authority.v1.AuthorityService/UpdateUser",
            );
            let mut req = request.into_request();
            req.extensions_mut()
                .insert(GrpcMethod::new("authority.v1.AuthorityService", "UpdateUser"));
            self.inner.unary(req, path, codec).await
        }
        pub async fn get_roles(
            &mut self,
            request: impl tonic::IntoRequest<super::VocabularyRequest>,
        ) -> std::result::Result<tonic::Response<super::RoleList>, tonic::Status> {
            self.inner
                .ready()
                .await
                .map_err(|e| {
                    tonic::Status::unknown(
                        format!("Service was not ready: {}", e.into()),
                    )
                })?;
            let codec = tonic_prost::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static(
                "/authority.v1.AuthorityService/GetRoles",
            );
            let mut req = request.into_request();
            req.extensions_mut()
                .insert(GrpcMethod::new("authority.v1.AuthorityService", "GetRoles"));
            self.inner.unary(req, path, codec).await
        }
        pub async fn get_departments(
            &mut self,
            request: impl tonic::IntoRequest<super::VocabularyRequest>,
        ) -> std::result::Result<tonic::Response<super::DepartmentList>, tonic::Status> {
            self.inner
                .ready()
                .await
                .map_err(|e| {
                    tonic::Status::unknown(
                        format!("Service was not ready: {}", e.into()),
                    )
                })?;
            let codec = tonic_prost::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static(
                "/authority.v1.AuthorityService/GetDepartments",
            );
            let mut req = request.into_request();
            req.extensions_mut()
                .insert(
                    GrpcMethod::new("authority.v1.AuthorityService", "GetDepartments"),
                );
            self.inner.unary(req, path, codec).await
        }
    }
}
