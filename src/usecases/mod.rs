macro_rules! usecase {
    ($n:ident : { $( $i:tt )* } => { $( $o:tt )* }) => {
        pub mod $n {
            #[allow(unused_imports)]
            use crate::entities;

            #[::async_trait::async_trait]
            pub trait Usecase {
                async fn handle(
                    &self,
                    data: Input,
                ) -> ::core::result::Result<Output, crate::errors::ClientError>;
            }

            #[derive(Debug)]
            pub struct Input { $( $i )* }

            #[derive(Debug)]
            pub struct Output { $( $o )* }
        }
    };
}

pub mod auth;
