// Mirrors the tables created by `db::init`. The schema prefix must match
// `constants::SCHEMA`.

diesel::table! {
    t_p36388408_peer_exchange_wallet.users (id) {
        id -> Int4,
        name -> Text,
        username -> Text,
        email -> Text,
        password_hash -> Text,
        avatar -> Text,
        verified -> Bool,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    t_p36388408_peer_exchange_wallet.wallets (user_id, currency) {
        user_id -> Int4,
        #[max_length = 10]
        currency -> Varchar,
        balance -> Numeric,
    }
}

diesel::table! {
    t_p36388408_peer_exchange_wallet.sessions (id) {
        id -> Int4,
        user_id -> Int4,
        #[max_length = 128]
        token -> Varchar,
        expires_at -> Timestamptz,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    t_p36388408_peer_exchange_wallet.transactions (id) {
        id -> Int4,
        #[sql_name = "type"]
        #[max_length = 32]
        kind -> Varchar,
        #[max_length = 10]
        currency -> Varchar,
        amount -> Numeric,
        #[max_length = 32]
        status -> Varchar,
        created_at -> Timestamptz,
        from_user_id -> Nullable<Int4>,
        to_user_id -> Nullable<Int4>,
    }
}

diesel::joinable!(sessions -> users (user_id));
diesel::joinable!(wallets -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(
    sessions,
    transactions,
    users,
    wallets,
);
