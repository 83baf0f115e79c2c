usecase! {
    register : {
        pub registration: entities::Registration,
    } => {
        pub user: entities::UserProfile,
    }
}

usecase! {
    login : {
        pub credentials: entities::Credentials,
    } => {
        pub user: entities::UserProfile,
    }
}

usecase! {
    logout : {} => {}
}
