//! Column layouts for every registered source.
//!
//! Flat files carry no header row, so these lists are the only source of
//! column identity. The order MUST match the published file layout for the
//! epoch the list is registered under.

// ============================================================================
// PENNSYLVANIA (Department of State flat files)
// ============================================================================

pub mod pa {
    pub const RECIPIENT_ID: &str = "RECIPIENT_ID";
    pub const DONOR_ID: &str = "DONOR_ID";
    pub const PAYEE_ID: &str = "PAYEE_ID";
    pub const REPORTER_ID: &str = "REPORTER_ID";
    pub const TIMESTAMP: &str = "TIMESTAMP";
    pub const YEAR: &str = "YEAR";
    pub const DONOR: &str = "DONOR";
    pub const DONOR_TYPE: &str = "DONOR_TYPE";
    pub const RECIPIENT: &str = "RECIPIENT";
    pub const RECIPIENT_TYPE: &str = "RECIPIENT_TYPE";
    pub const RECIPIENT_OFFICE: &str = "RECIPIENT_OFFICE";
    pub const PARTY: &str = "PARTY";
    pub const PURPOSE: &str = "PURPOSE";
    pub const TOTAL_CONT_AMT: &str = "TOTAL_CONT_AMT";
    pub const EXPENSE_AMT: &str = "EXPENSE_AMT";
    pub const EXPENSE_DATE: &str = "EXPENSE_DATE";
    pub const EXPENSE_REPORTER_ID: &str = "EXPENSE_REPORTER_ID";
    pub const EXPENSE_TIMESTAMP: &str = "EXPENSE_TIMESTAMP";
    pub const DATE: &str = "DATE";
    pub const TRANSACTION_TYPE: &str = "TRANSACTION_TYPE";
    pub const OFFICE_SOUGHT: &str = "office_sought";

    /// Suffix given to filer columns that collide with expenditure columns
    pub const FILER_SUFFIX: &str = "_FILER";
    pub const RECIPIENT_FILER: &str = "RECIPIENT_FILER";
    pub const RECIPIENT_TYPE_FILER: &str = "RECIPIENT_TYPE_FILER";

    /// Split contribution fields: (date, amount) pairs summed into TOTAL_CONT_AMT
    pub const CONT_SPLITS: [(&str, &str); 3] = [
        ("CONT_DATE_1", "CONT_AMT_1"),
        ("CONT_DATE_2", "CONT_AMT_2"),
        ("CONT_DATE_3", "CONT_AMT_3"),
    ];

    pub const CONTRIBUTIONS_PRE_2022: &[&str] = &[
        "RECIPIENT_ID",
        "YEAR",
        "CYCLE",
        "SECTION",
        "DONOR",
        "ADDRESS_1",
        "ADDRESS_2",
        "CITY",
        "STATE",
        "ZIPCODE",
        "OCCUPATION",
        "E_NAME",
        "E_ADDRESS_1",
        "E_ADDRESS_2",
        "E_CITY",
        "E_STATE",
        "E_ZIPCODE",
        "CONT_DATE_1",
        "CONT_AMT_1",
        "CONT_DATE_2",
        "CONT_AMT_2",
        "CONT_DATE_3",
        "CONT_AMT_3",
        "PURPOSE",
    ];

    // 2022 onward: report id and filing timestamp follow the filer id
    pub const CONTRIBUTIONS_POST_2022: &[&str] = &[
        "RECIPIENT_ID",
        "REPORTER_ID",
        "TIMESTAMP",
        "YEAR",
        "CYCLE",
        "SECTION",
        "DONOR",
        "ADDRESS_1",
        "ADDRESS_2",
        "CITY",
        "STATE",
        "ZIPCODE",
        "OCCUPATION",
        "E_NAME",
        "E_ADDRESS_1",
        "E_ADDRESS_2",
        "E_CITY",
        "E_STATE",
        "E_ZIPCODE",
        "CONT_DATE_1",
        "CONT_AMT_1",
        "CONT_DATE_2",
        "CONT_AMT_2",
        "CONT_DATE_3",
        "CONT_AMT_3",
        "PURPOSE",
    ];

    /// Dropped from contributions after TOTAL_CONT_AMT and DATE are derived
    pub const CONTRIBUTION_DROPS: &[&str] = &[
        "ADDRESS_1",
        "ADDRESS_2",
        "CITY",
        "STATE",
        "ZIPCODE",
        "OCCUPATION",
        "E_NAME",
        "E_ADDRESS_1",
        "E_ADDRESS_2",
        "E_CITY",
        "E_STATE",
        "E_ZIPCODE",
        "SECTION",
        "CYCLE",
        "PURPOSE",
        "CONT_DATE_1",
        "CONT_AMT_1",
        "CONT_DATE_2",
        "CONT_AMT_2",
        "CONT_DATE_3",
        "CONT_AMT_3",
        "TIMESTAMP",
        "REPORTER_ID",
    ];

    pub const FILERS_PRE_2022: &[&str] = &[
        "RECIPIENT_ID",
        "YEAR",
        "CYCLE",
        "AMEND",
        "TERMINATE",
        "RECIPIENT_TYPE",
        "RECIPIENT",
        "RECIPIENT_OFFICE",
        "DISTRICT",
        "PARTY",
        "ADDRESS_1",
        "ADDRESS_2",
        "CITY",
        "STATE",
        "ZIPCODE",
        "COUNTY",
        "PHONE",
        "BEGINNING",
        "MONETARY",
        "INKIND",
    ];

    pub const FILERS_POST_2022: &[&str] = &[
        "RECIPIENT_ID",
        "REPORTER_ID",
        "TIMESTAMP",
        "YEAR",
        "CYCLE",
        "AMEND",
        "TERMINATE",
        "RECIPIENT_TYPE",
        "RECIPIENT",
        "RECIPIENT_OFFICE",
        "DISTRICT",
        "PARTY",
        "ADDRESS_1",
        "ADDRESS_2",
        "CITY",
        "STATE",
        "ZIPCODE",
        "COUNTY",
        "PHONE",
        "BEGINNING",
        "MONETARY",
        "INKIND",
    ];

    pub const FILER_DROPS: &[&str] = &[
        "YEAR",
        "CYCLE",
        "AMEND",
        "TERMINATE",
        "DISTRICT",
        "ADDRESS_1",
        "ADDRESS_2",
        "CITY",
        "STATE",
        "ZIPCODE",
        "COUNTY",
        "PHONE",
        "BEGINNING",
        "MONETARY",
        "INKIND",
        "TIMESTAMP",
        "REPORTER_ID",
    ];

    pub const EXPENSES_PRE_2022: &[&str] = &[
        "DONOR_ID",
        "EXPENSE_YEAR",
        "EXPENSE_CYCLE",
        "RECIPIENT",
        "EXPENSE_ADDRESS_1",
        "EXPENSE_ADDRESS_2",
        "EXPENSE_CITY",
        "EXPENSE_STATE",
        "EXPENSE_ZIPCODE",
        "EXPENSE_DATE",
        "EXPENSE_AMT",
        "PURPOSE",
    ];

    pub const EXPENSES_POST_2022: &[&str] = &[
        "DONOR_ID",
        "EXPENSE_REPORTER_ID",
        "EXPENSE_TIMESTAMP",
        "EXPENSE_YEAR",
        "EXPENSE_CYCLE",
        "RECIPIENT",
        "EXPENSE_ADDRESS_1",
        "EXPENSE_ADDRESS_2",
        "EXPENSE_CITY",
        "EXPENSE_STATE",
        "EXPENSE_ZIPCODE",
        "EXPENSE_DATE",
        "EXPENSE_AMT",
        "PURPOSE",
    ];

    pub const EXPENSE_DROPS: &[&str] = &[
        "EXPENSE_YEAR",
        "EXPENSE_CYCLE",
        "EXPENSE_ADDRESS_1",
        "EXPENSE_ADDRESS_2",
        "EXPENSE_CITY",
        "EXPENSE_STATE",
        "EXPENSE_ZIPCODE",
        "EXPENSE_DATE",
        "EXPENSE_TIMESTAMP",
        "EXPENSE_REPORTER_ID",
    ];
}

// ============================================================================
// ARIZONA (See The Money reporting API)
// ============================================================================

pub mod az {
    pub const TRANSACTION_ID: &str = "TransactionId";
    pub const TRANSACTION_DATE: &str = "TransactionDate";
    pub const TRANSACTION_TYPE: &str = "TransactionType";
    /// 1 = income to the retrieved entity, 2 = expense paid by it
    pub const DISPOSITION: &str = "TransactionTypeDispositionId";
    pub const AMOUNT: &str = "Amount";
    pub const TRANSACTION_NAME: &str = "TransactionName";
    pub const TRANSACTION_FIRST_NAME: &str = "TransactionFirstName";
    pub const TRANSACTION_LAST_NAME: &str = "TransactionLastName";
    pub const TRANSACTION_NAME_ID: &str = "TransactionNameId";
    pub const TRANSACTION_OCCUPATION: &str = "TransactionOccupation";
    pub const TRANSACTION_EMPLOYER: &str = "TransactionEmployer";
    pub const MEMO: &str = "Memo";
    /// Stamped by the fetcher: the entity whose detail page produced the row
    pub const RETRIEVED_ID: &str = "retrieved_id";

    pub const ENTITY_ID: &str = "EntityID";
    pub const ENTITY_LAST_NAME: &str = "EntityLastName";
    pub const ENTITY_FIRST_NAME: &str = "EntityFirstName";
    pub const OFFICE_NAME: &str = "OfficeName";
    pub const PARTY_NAME: &str = "PartyName";
    /// Added at preprocess time from the aggregate category of the batch
    pub const ENTITY_TYPE: &str = "entity_type";

    // Columns derived while cleaning
    pub const ENTITY_NAME: &str = "entity_name";
    pub const OFFICE: &str = "office_name";
    pub const PARTY: &str = "party";
    pub const EMPLOYER: &str = "employer";
    pub const OCCUPATION: &str = "occupation";
    pub const BASE_TRANSACTOR_ID: &str = "base_transactor_id";
    pub const COUNTERPARTY_ID: &str = "counterparty_id";
    pub const COUNTERPARTY_NAME: &str = "counterparty_name";
    pub const COUNTERPARTY_TYPE: &str = "counterparty_type";
    pub const DATE: &str = "date";
    pub const OFFICE_SOUGHT: &str = "office_sought";

    pub const TRANSACTIONS: &[&str] = &[
        "TransactionId",
        "TransactionDate",
        "TransactionType",
        "TransactionTypeDispositionId",
        "Amount",
        "TransactionName",
        "TransactionFirstName",
        "TransactionLastName",
        "TransactionNameId",
        "TransactionOccupation",
        "TransactionEmployer",
        "TransactionCity",
        "TransactionState",
        "TransactionZipCode",
        "Memo",
        "retrieved_id",
    ];

    pub const ENTITIES: &[&str] = &[
        "EntityID",
        "EntityLastName",
        "EntityFirstName",
        "OfficeName",
        "PartyName",
        "Income",
        "Expense",
        "CashBalance",
    ];
}

// ============================================================================
// MICHIGAN (Bureau of Elections dump files)
// ============================================================================

pub mod mi {
    pub const CONTRIBUTIONS: &[&str] = &[
        "doc_seq_no",
        "page_no",
        "contribution_id",
        "cont_detail_id",
        "doc_stmnt_year",
        "doc_type_desc",
        "com_legal_name",
        "common_name",
        "cfr_com_id",
        "com_type",
        "can_first_name",
        "can_last_name",
        "contribtype",
        "f_name",
        "l_name_or_org",
        "address",
        "city",
        "state",
        "zip",
        "occupation",
        "employer",
        "received_date",
        "amount",
        "aggregate",
        "extra_desc",
    ];

    pub const EXPENDITURES: &[&str] = &[
        "doc_seq_no",
        "expenditure_type",
        "gub_account_type",
        "gub_elec_type",
        "page_no",
        "expense_id",
        "detail_id",
        "doc_stmnt_year",
        "doc_type_desc",
        "com_legal_name",
        "common_name",
        "cfr_com_id",
        "com_type",
        "schedule_desc",
        "exp_desc",
        "purpose",
        "extra_desc",
        "f_name",
        "lname_or_org",
        "address",
        "city",
        "state",
        "zip",
        "exp_date",
        "amount",
        "state_loc",
        "supp_opp",
        "can_or_ballot",
        "county",
        "debt_payment",
        "vend_name",
        "vend_addr",
        "vend_city",
        "vend_state",
        "vend_zip",
        "gotv_ink_ind",
        "fundraiser",
    ];
}

// ============================================================================
// MINNESOTA (Campaign Finance Board exports)
// ============================================================================

pub mod mn {
    pub const CANDIDATE_CONTRIBUTIONS: &[&str] = &[
        "OfficeSought",
        "Party",
        "CandRegNumb",
        "CandFirstName",
        "CandLastName",
        "DonationDate",
        "DonorType",
        "DonorName",
        "DonationAmount",
        "InKindDonAmount",
        "InKindDescriptionText",
    ];

    pub const NONCANDIDATE_CONTRIBUTIONS: &[&str] = &[
        "PCFRegNumb",
        "Committee",
        "ETType",
        "DonationDate",
        "DonorType",
        "DonorRegNumb",
        "DonorName",
        "DonationAmount",
        "InKindDonAmount",
        "InKindDescriptionText",
    ];

    pub const INDEPENDENT_EXPENDITURES: &[&str] = &[
        "Spender",
        "Spender Reg Num",
        "Spender type",
        "Affected Comte Name",
        "Affected Cmte Reg Num",
        "For /Against",
        "Date",
        "Type",
        "Amount",
        "Purpose",
        "Vendor State",
    ];
}
