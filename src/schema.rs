diesel::table! {
    accounts (id) {
        id -> Text,
        username -> Text,
        email -> Text,
        password_hash -> Text,
        display_name -> Text,
        role -> Text,
        created_at -> Timestamp,
        updated_at -> Timestamp,
    }
}

diesel::table! {
    documents (id) {
        id -> Text,
        title -> Text,
        content -> Text,
        status -> Text,
        version -> Integer,
        category -> Nullable<Text>,
        created_by -> Text,
        created_at -> Timestamp,
        updated_at -> Timestamp,
        expires_at -> Nullable<Timestamp>,
    }
}

diesel::table! {
    document_versions (id) {
        id -> Text,
        document_id -> Text,
        version_number -> Integer,
        content -> Text,
        created_by -> Text,
        created_at -> Timestamp,
    }
}

diesel::table! {
    user_documents (id) {
        id -> Text,
        owner_id -> Text,
        title -> Text,
        description -> Nullable<Text>,
        file_name -> Text,
        file_type -> Text,
        file_size -> BigInt,
        file_location -> Text,
        tags -> Nullable<Text>,
        category -> Text,
        starred -> Bool,
        status -> Text,
        is_folder_placeholder -> Bool,
        created_at -> Timestamp,
        updated_at -> Timestamp,
    }
}

diesel::table! {
    compliance_deadlines (id) {
        id -> Text,
        title -> Text,
        description -> Nullable<Text>,
        kind -> Text,
        due_at -> Timestamp,
        status -> Text,
        assignee_id -> Nullable<Text>,
        document_id -> Nullable<Text>,
        created_at -> Timestamp,
        updated_at -> Timestamp,
    }
}

diesel::table! {
    audit_trail (id) {
        id -> Text,
        document_id -> Text,
        account_id -> Text,
        action -> Text,
        details -> Nullable<Text>,
        recorded_at -> Timestamp,
    }
}

diesel::table! {
    notifications (id) {
        id -> Text,
        owner_id -> Text,
        kind -> Text,
        title -> Text,
        message -> Text,
        priority -> Text,
        read -> Bool,
        created_at -> Timestamp,
    }
}

diesel::table! {
    templates (id) {
        id -> Text,
        name -> Text,
        content -> Text,
        category -> Nullable<Text>,
        updated_at -> Timestamp,
    }
}

diesel::joinable!(documents -> accounts (created_by));
diesel::joinable!(document_versions -> documents (document_id));

diesel::allow_tables_to_appear_in_same_query!(
    accounts,
    audit_trail,
    compliance_deadlines,
    document_versions,
    documents,
    notifications,
    templates,
    user_documents,
);
