table! {
    comments (id) {
        id -> Int4,
        text -> Text,
        created -> Timestamp,
        post_id -> Int4,
        author_id -> Int4,
    }
}

table! {
    follows (id) {
        id -> Int4,
        user_id -> Int4,
        author_id -> Int4,
        created -> Timestamp,
    }
}

table! {
    groups (id) {
        id -> Int4,
        title -> Varchar,
        slug -> Varchar,
        description -> Nullable<Text>,
    }
}

table! {
    posts (id) {
        id -> Int4,
        text -> Text,
        pub_date -> Timestamp,
        author_id -> Int4,
        group_id -> Nullable<Int4>,
        image -> Nullable<Varchar>,
    }
}

table! {
    users (id) {
        id -> Int4,
        username -> Varchar,
        email -> Varchar,
        hashed_password -> Varchar,
        creation_date -> Timestamp,
    }
}

joinable!(comments -> posts (post_id));
joinable!(comments -> users (author_id));
joinable!(posts -> groups (group_id));
joinable!(posts -> users (author_id));

allow_tables_to_appear_in_same_query!(comments, follows, groups, posts, users);
