// Diesel table definitions matching migrations/.

diesel::table! {
    trending_topics (id) {
        id -> Text,
        title -> Text,
        category -> Text,
        source -> Text,
        engagement -> Double,
        created_at -> Text,
        payload -> Text,
    }
}

diesel::table! {
    market_proposals (id) {
        id -> Text,
        question -> Text,
        category -> Text,
        status -> Text,
        end_date -> Text,
        topic_id -> Nullable<Text>,
        created_at -> Text,
        payload -> Text,
    }
}

diesel::table! {
    workflow_sessions (id) {
        id -> Text,
        status -> Text,
        updated_at -> Text,
        payload -> Text,
    }
}

diesel::allow_tables_to_appear_in_same_query!(trending_topics, market_proposals, workflow_sessions);
