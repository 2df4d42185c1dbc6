//! GraphQL documents sent to the indexer.

pub struct Operation {
    pub name: &'static str,
    pub document: &'static str,
}

pub const LATEST_HEIGHT: Operation = Operation {
    name: "GetLatestHeight",
    document: r#"
        query GetLatestHeight {
            latestHeight
        }
    "#,
};

pub const BLOCK_BY_NUMBER: Operation = Operation {
    name: "GetBlockByNumber",
    document: r#"
        query GetBlockByNumber($number: String!) {
            block(number: $number) {
                number hash parentHash timestamp miner gasUsed gasLimit
                transactionCount baseFeePerGas size extraData
            }
        }
    "#,
};

pub const BLOCK_BY_HASH: Operation = Operation {
    name: "GetBlockByHash",
    document: r#"
        query GetBlockByHash($hash: String!) {
            blockByHash(hash: $hash) {
                number hash parentHash timestamp miner gasUsed gasLimit
                transactionCount baseFeePerGas size extraData
            }
        }
    "#,
};

pub const ADDRESS_BALANCE: Operation = Operation {
    name: "GetAddressBalance",
    document: r#"
        query GetAddressBalance($address: String!) {
            addressBalance(address: $address) {
                address
                balance
                blockNumber
            }
        }
    "#,
};

pub const ADDRESS_ACTIVITY: Operation = Operation {
    name: "GetAddressActivity",
    document: r#"
        query GetAddressActivity($address: String!) {
            addressActivity(address: $address) {
                transactionCount
                firstSeen
                lastSeen
            }
        }
    "#,
};

pub const CONTRACT_CREATION: Operation = Operation {
    name: "GetContractCreation",
    document: r#"
        query GetContractCreation($address: String!) {
            contractCreation(address: $address) {
                contractAddress
                creator
                transactionHash
                blockNumber
                timestamp
            }
        }
    "#,
};

pub const VERIFIED_CONTRACT: Operation = Operation {
    name: "GetVerifiedContract",
    document: r#"
        query GetVerifiedContract($address: String!) {
            verifiedContract(address: $address) {
                address
                name
                compilerVersion
                optimizationEnabled
                optimizationRuns
                evmVersion
                licenseType
                sourceCode
                abi
                constructorArguments
                verifiedAt
            }
        }
    "#,
};

pub const TOKEN_BALANCES: Operation = Operation {
    name: "GetTokenBalances",
    document: r#"
        query GetTokenBalances($address: String!, $limit: Int!, $offset: Int!) {
            addressTokenBalances(address: $address, limit: $limit, offset: $offset) {
                nodes {
                    contractAddress
                    tokenType
                    balance
                    tokenId
                    name
                    symbol
                    decimals
                }
                totalCount
            }
        }
    "#,
};

pub const TRANSACTIONS_BY_ADDRESS: Operation = Operation {
    name: "GetTransactionsByAddress",
    document: r#"
        query GetTransactionsByAddress($address: String!, $limit: Int!, $offset: Int!) {
            transactionsByAddress(address: $address, limit: $limit, offset: $offset) {
                nodes {
                    hash blockNumber blockHash transactionIndex from to value
                    gas gasPrice maxFeePerGas maxPriorityFeePerGas nonce input
                    type timestamp
                    receipt { status gasUsed effectiveGasPrice contractAddress }
                }
                totalCount
            }
        }
    "#,
};

pub const TRANSACTION: Operation = Operation {
    name: "GetTransaction",
    document: r#"
        query GetTransaction($hash: String!) {
            transaction(hash: $hash) {
                hash blockNumber blockHash transactionIndex from to value
                gas gasPrice maxFeePerGas maxPriorityFeePerGas nonce input
                type timestamp
                receipt {
                    status gasUsed effectiveGasPrice contractAddress
                    logs { address topics data blockNumber transactionHash logIndex timestamp }
                }
            }
        }
    "#,
};

pub const RECENT_GAS_PRICES: Operation = Operation {
    name: "GetRecentGasPrices",
    document: r#"
        query GetRecentGasPrices($limit: Int!) {
            transactions(limit: $limit, offset: 0) {
                nodes { gasPrice }
            }
        }
    "#,
};

pub const ADDRESS_LOGS: Operation = Operation {
    name: "GetAddressLogs",
    document: r#"
        query GetAddressLogs($address: String!, $limit: Int!, $offset: Int!) {
            logsByParticipant(address: $address, limit: $limit, offset: $offset) {
                nodes { address topics data blockNumber transactionHash logIndex timestamp }
                totalCount
            }
        }
    "#,
};

pub const CONTRACT_LOGS: Operation = Operation {
    name: "GetContractLogs",
    document: r#"
        query GetContractLogs($address: String!, $limit: Int!, $offset: Int!) {
            logs(filter: { address: $address }, limit: $limit, offset: $offset) {
                nodes { address topics data blockNumber transactionHash logIndex timestamp }
                totalCount
            }
        }
    "#,
};

pub const TOKEN_HOLDERS: Operation = Operation {
    name: "GetTokenHolders",
    document: r#"
        query GetTokenHolders($token: String!, $limit: Int!, $offset: Int!) {
            tokenHolders(token: $token, limit: $limit, offset: $offset) {
                nodes { address balance }
                totalCount
            }
        }
    "#,
};

pub const TOKEN_METADATA: Operation = Operation {
    name: "GetTokenMetadata",
    document: r#"
        query GetTokenMetadata($address: String!) {
            tokenMetadata(address: $address) {
                name
                symbol
                decimals
                totalSupply
            }
        }
    "#,
};

pub const VALIDATORS: Operation = Operation {
    name: "GetValidators",
    document: r#"
        query GetValidators {
            validators {
                address
                active
            }
        }
    "#,
};

pub const NETWORK_METRICS: Operation = Operation {
    name: "GetNetworkMetrics",
    document: r#"
        query GetNetworkMetrics($since: String!) {
            networkMetrics(since: $since) {
                transactionCount
                blockCount
                averageBlockTime
                averageGasPrice
                activeAddresses
                totalGasUsed
            }
        }
    "#,
};
