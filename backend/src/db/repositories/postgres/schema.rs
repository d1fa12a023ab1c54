// Read-only view of the dashboard's lifecycle tables.

diesel::table! {
    tbl_produk (id) {
        id -> Int4,
        produk -> Varchar,
        id_stage -> Nullable<Int4>,
        id_segmen -> Nullable<Int4>,
        id_kategori -> Nullable<Int4>,
        created_at -> Nullable<Timestamp>,
        tanggal_stage_start -> Nullable<Timestamp>,
        tanggal_stage_end -> Nullable<Timestamp>,
    }
}

diesel::table! {
    tbl_kategori (id) {
        id -> Int4,
        kategori -> Varchar,
    }
}

diesel::table! {
    tbl_segmen (id) {
        id -> Int4,
        segmen -> Varchar,
    }
}

diesel::table! {
    tbl_stage (id) {
        id -> Int4,
        stage -> Varchar,
    }
}

diesel::table! {
    tbl_stage_histori (id) {
        id -> Int4,
        id_produk -> Int4,
        stage_previous -> Nullable<Int4>,
        stage_now -> Int4,
        tanggal_perubahan -> Nullable<Timestamp>,
        created_at -> Nullable<Timestamp>,
    }
}

diesel::table! {
    tbl_interval_stage (id) {
        id -> Int4,
        id_stage_previous -> Int4,
        id_stage_next -> Int4,
        interval -> Int4,
    }
}

diesel::joinable!(tbl_produk -> tbl_kategori (id_kategori));
diesel::joinable!(tbl_produk -> tbl_segmen (id_segmen));
diesel::joinable!(tbl_produk -> tbl_stage (id_stage));
diesel::joinable!(tbl_stage_histori -> tbl_produk (id_produk));

diesel::allow_tables_to_appear_in_same_query!(
    tbl_interval_stage,
    tbl_kategori,
    tbl_produk,
    tbl_segmen,
    tbl_stage,
    tbl_stage_histori,
);
