/// Generate client methods with oneshot channel boilerplate and automatic tracing.
///
/// The `read` form retries transient failures per the client's policy, so its
/// parameters must be `Clone`. The plain form sends the request exactly once.
macro_rules! remote_method {
    (read $client:ty => fn $method:ident($($param:ident: $param_type:ty),*) -> $return_type:ty as $request:ident::$variant:ident, Error = $error_type:ty) => {
        impl $client {
            #[tracing::instrument(skip(self))]
            pub async fn $method(&self, $($param: $param_type),*) -> Result<$return_type, $error_type> {
                tracing::debug!("Sending request");
                self.channel
                    .call_idempotent(|respond_to| $request::$variant {
                        $($param: $param.clone(),)*
                        respond_to,
                    })
                    .await
            }
        }
    };
    ($client:ty => fn $method:ident($($param:ident: $param_type:ty),*) -> $return_type:ty as $request:ident::$variant:ident, Error = $error_type:ty) => {
        impl $client {
            #[tracing::instrument(skip(self))]
            pub async fn $method(&self, $($param: $param_type),*) -> Result<$return_type, $error_type> {
                tracing::debug!("Sending request");
                self.channel
                    .call(|respond_to| $request::$variant {
                        $($param,)*
                        respond_to,
                    })
                    .await
            }
        }
    };
}

/// Generate the constructor shared by every remote client.
macro_rules! remote_client_new {
    ($client:ident, $request:ty) => {
        impl $client {
            pub fn new(
                sender: tokio::sync::mpsc::Sender<$request>,
                policy: $crate::transport::RetryPolicy,
            ) -> Self {
                Self {
                    channel: $crate::transport::RemoteChannel::new(sender, policy),
                }
            }
        }
    };
}
